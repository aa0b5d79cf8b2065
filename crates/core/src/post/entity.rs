use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::{Id, ValidationError, require_text};

/// 留言实体，`/posts` 资源。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Post {
    pub id: Id,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    content: String,
}

impl NewPost {
    pub fn new(content: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            content: require_text("content", content)?,
        })
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PostPatch {
    pub content: Option<String>,
}

impl PostPatch {
    pub fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            content: self
                .content
                .map(|c| require_text("content", &c))
                .transpose()?,
        })
    }
}
