use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

/// Envelope code the service uses for success.
pub const SUCCESS_CODE: i64 = 200;

/// Public profile page for a creator.
const PROFILE_BASE_URL: &str = "https://space.bilibili.com";

fn default_code() -> i64 {
    SUCCESS_CODE
}

/// A creator matched by a name search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultRecord {
    #[serde(rename = "mid")]
    pub entity_id: i64,
    #[serde(rename = "uname")]
    pub display_name: String,
    #[serde(rename = "upic", default)]
    pub avatar_ref: String,
    #[serde(rename = "fans", default)]
    pub follower_count: i64,
}

impl SearchResultRecord {
    /// Link to the creator's public profile.
    pub fn profile_url(&self) -> String {
        format!("{}/{}", PROFILE_BASE_URL, self.entity_id)
    }

    /// Thumbnail URL for the avatar, routed through an image proxy when one is configured.
    pub fn avatar_url(&self, proxy: Option<&str>) -> String {
        match proxy {
            Some(proxy) => format!("{}?url={}@60w_60h.webp", proxy, self.avatar_ref),
            None => self.avatar_ref.clone(),
        }
    }
}

/// A subscription group, as seen from one creator's point of view.
///
/// `is_member` is the server's snapshot at fetch time for the creator the
/// list was requested for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    #[serde(rename = "gid")]
    pub group_id: i64,
    pub group_name: String,
    #[serde(rename = "count", default)]
    pub member_count: i64,
    #[serde(rename = "in_this_group", default)]
    pub is_member: bool,
}

/// Query for `GET /subscribe/search`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchQuery {
    #[serde(rename = "search_name")]
    pub name: String,
}

/// Query for `GET /group/list/mid`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GroupListParams {
    #[serde(rename = "mid")]
    pub entity_id: i64,
}

/// Body of `POST /subscribe/do`: the final selected group set for one creator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    pub entity_id: i64,
    pub group_ids: Vec<i64>,
}

impl SubmissionPayload {
    /// Flat form fields: `mid` once, then `gid` repeated per selected group.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::with_capacity(self.group_ids.len() + 1);
        fields.push(("mid", self.entity_id.to_string()));
        for gid in &self.group_ids {
            fields.push(("gid", gid.to_string()));
        }
        fields
    }
}

/// Response envelope shared by every endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default = "default_code")]
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Unwrap the payload, treating any non-success code as a failure.
    pub fn into_data(self) -> Result<T> {
        if self.code != SUCCESS_CODE {
            return Err(ApiError::Application {
                code: self.code,
                message: self.msg,
            });
        }
        self.data
            .ok_or_else(|| ApiError::Decode("response carried no data".to_string()))
    }
}

/// Result of a subscription submit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmitResponse {
    #[serde(default = "default_code")]
    pub code: i64,
    #[serde(default)]
    pub msg: String,
}

impl SubmitResponse {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Convert a non-success code into an application failure.
    pub fn into_result(self) -> Result<SubmitResponse> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ApiError::Application {
                code: self.code,
                message: self.msg,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_search_results_with_wire_names() {
        let body = r#"{"code":200,"msg":"ok","data":[
            {"mid":42,"uname":"alice","upic":"http://img/a.jpg","fans":1200},
            {"mid":7,"uname":"bob","upic":"","fans":0}
        ]}"#;

        let resp: ApiResponse<Vec<SearchResultRecord>> = serde_json::from_str(body).unwrap();
        let records = resp.into_data().unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].entity_id, 42);
        assert_eq!(records[0].display_name, "alice");
        assert_eq!(records[0].follower_count, 1200);
        assert_eq!(records[1].entity_id, 7);
    }

    #[test]
    fn missing_code_is_treated_as_success() {
        let body = r#"{"data":[{"gid":1,"group_name":"A","count":5,"in_this_group":true}]}"#;

        let resp: ApiResponse<Vec<GroupRecord>> = serde_json::from_str(body).unwrap();
        let groups = resp.into_data().unwrap();

        assert_eq!(
            groups,
            vec![GroupRecord {
                group_id: 1,
                group_name: "A".to_string(),
                member_count: 5,
                is_member: true,
            }]
        );
    }

    #[test]
    fn failure_code_becomes_application_error() {
        let body = r#"{"code":500,"msg":"not logged in","data":null}"#;

        let resp: ApiResponse<Vec<GroupRecord>> = serde_json::from_str(body).unwrap();
        let err = resp.into_data().unwrap_err();

        assert_eq!(
            err,
            ApiError::Application {
                code: 500,
                message: "not logged in".to_string()
            }
        );
        assert!(err.is_application());
    }

    #[test]
    fn success_without_data_is_a_decode_error() {
        let resp: ApiResponse<Vec<GroupRecord>> =
            serde_json::from_str(r#"{"code":200,"msg":""}"#).unwrap();

        assert!(matches!(resp.into_data(), Err(ApiError::Decode(_))));
    }

    #[test]
    fn form_fields_repeat_gid_per_group() {
        let payload = SubmissionPayload {
            entity_id: 42,
            group_ids: vec![1, 2, 9],
        };

        assert_eq!(
            payload.form_fields(),
            vec![
                ("mid", "42".to_string()),
                ("gid", "1".to_string()),
                ("gid", "2".to_string()),
                ("gid", "9".to_string()),
            ]
        );
    }

    #[test]
    fn form_fields_with_no_groups_still_carry_mid() {
        let payload = SubmissionPayload {
            entity_id: 3,
            group_ids: vec![],
        };

        assert_eq!(payload.form_fields(), vec![("mid", "3".to_string())]);
    }

    #[test]
    fn submit_response_checks_code() {
        let ok = SubmitResponse {
            code: 200,
            msg: "done".to_string(),
        };
        assert!(ok.clone().into_result().is_ok());

        let failed = SubmitResponse {
            code: 403,
            msg: "forbidden".to_string(),
        };
        assert_eq!(
            failed.into_result(),
            Err(ApiError::Application {
                code: 403,
                message: "forbidden".to_string()
            })
        );
    }

    #[test]
    fn profile_and_avatar_links() {
        let record = SearchResultRecord {
            entity_id: 42,
            display_name: "alice".to_string(),
            avatar_ref: "http://img/a.jpg".to_string(),
            follower_count: 0,
        };

        assert_eq!(record.profile_url(), "https://space.bilibili.com/42");
        assert_eq!(record.avatar_url(None), "http://img/a.jpg");
        assert_eq!(
            record.avatar_url(Some("http://proxy/pic/")),
            "http://proxy/pic/?url=http://img/a.jpg@60w_60h.webp"
        );
    }
}
