use serde::{Deserialize, Serialize};

/// A post as served by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
  pub id: u64,
  pub title: String,
  pub body: String,
  #[serde(rename = "userId")]
  pub user_id: u64,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_decodes_wire_names() {
    let post: Post = serde_json::from_str(
      r#"{"userId": 3, "id": 21, "title": "asperiores", "body": "repellat"}"#,
    )
    .unwrap();

    assert_eq!(post.id, 21);
    assert_eq!(post.user_id, 3);
    assert_eq!(post.title, "asperiores");
  }
}
