mod paged_posts;
mod posts;
mod products;

pub use paged_posts::PagedPostsView;
pub use posts::PostsView;
pub use products::ProductsView;
