use super::Product;

fn product(id: u32, name: &str, category: &str, price: f64, description: &str) -> Product {
  Product {
    id,
    name: name.to_string(),
    category: category.to_string(),
    price,
    description: Some(description.to_string()),
  }
}

/// The built-in demo catalog
pub fn sample_products() -> Vec<Product> {
  vec![
    product(1, "iPhone 14", "Electronics", 999.0, "Latest Apple smartphone"),
    product(2, "MacBook Pro", "Electronics", 1999.0, "Professional laptop"),
    product(3, "Nike Air Max", "Clothing", 120.0, "Comfortable running shoes"),
    product(4, "Levi's Jeans", "Clothing", 80.0, "Classic denim jeans"),
    product(5, "Coffee Maker", "Home", 150.0, "Automatic drip coffee maker"),
    product(6, "Blender", "Home", 75.0, "High-speed blender"),
    product(7, "Samsung Galaxy", "Electronics", 899.0, "Android smartphone"),
    product(8, "Adidas Hoodie", "Clothing", 60.0, "Comfortable hoodie"),
    product(9, "Desk Lamp", "Home", 45.0, "LED desk lamp"),
    product(10, "Wireless Headphones", "Electronics", 200.0, "Noise-canceling headphones"),
    product(11, "Running Shorts", "Clothing", 35.0, "Athletic shorts"),
    product(12, "Kitchen Scale", "Home", 25.0, "Digital kitchen scale"),
    product(13, "Tablet", "Electronics", 399.0, "10-inch tablet"),
    product(14, "Winter Jacket", "Clothing", 180.0, "Waterproof winter jacket"),
    product(15, "Air Purifier", "Home", 250.0, "HEPA air purifier"),
  ]
}
