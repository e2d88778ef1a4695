use serde::{Deserialize, Serialize};

/// Authenticated profile as returned by `/auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub name: String,
    #[serde(default, alias = "avatar_url")]
    pub picture: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_picture_or_avatar_url() {
        let a: UserProfile = serde_json::from_str(
            r#"{"id":1,"email":"a@b.c","name":"A","picture":"https://img/a.png"}"#,
        )
        .unwrap();
        let b: UserProfile = serde_json::from_str(
            r#"{"id":1,"email":"a@b.c","name":"A","avatar_url":"https://img/a.png"}"#,
        )
        .unwrap();
        assert_eq!(a.picture, b.picture);
    }
}
