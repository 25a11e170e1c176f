use {
    chrono::{DateTime, Local, TimeZone, Utc},
    serde::{Serialize, Deserialize},
    serde_json::Value,
    typed_builder::TypedBuilder,
    crate::error::MalformedRecord,
};

pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const COMMENT_TABLE_HEADERS: [&str; 4] = ["昵称", "点赞数", "时间", "评论"];

#[derive(TypedBuilder, Clone, Debug, PartialEq, Eq)]
pub struct CommentRecord {
    #[builder(default, setter(strip_option))]
    id: Option<String>,
    nickname: String,
    text: String,
    like_count: u64,
    created_at: DateTime<Utc>,
}

/// Identity used by the collector to drop records it has already sunk.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RecordKey {
    Id(String),
    Content {
        nickname: String,
        created_at: i64,
        text: String,
    },
}

/// One row of the persisted comment table.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CommentRow {
    #[serde(rename = "昵称")]
    pub nickname: String,
    #[serde(rename = "点赞数")]
    pub digg_count: u64,
    #[serde(rename = "时间")]
    pub formatted_time: String,
    #[serde(rename = "评论")]
    pub text: Option<String>,
}

/// Response body of one captured page.
#[derive(Deserialize, Debug, Default)]
pub struct CommentPage {
    #[serde(default)]
    comments: Option<Vec<Value>>,
    has_more: Option<i64>,
    cursor: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct RawComment {
    cid: Option<Value>,
    text: Option<String>,
    user: Option<RawUser>,
    create_time: Option<i64>,
    digg_count: Option<i64>,
}

#[derive(Deserialize, Debug)]
struct RawUser {
    nickname: Option<String>,
}

impl CommentRecord {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn like_count(&self) -> u64 {
        self.like_count
    }

    pub fn created_at(&self) -> &DateTime<Utc> {
        &self.created_at
    }

    pub fn key(&self) -> RecordKey {
        match &self.id {
            Some(id) => RecordKey::Id(id.clone()),
            None => RecordKey::Content {
                nickname: self.nickname.clone(),
                created_at: self.created_at.timestamp(),
                text: self.text.clone(),
            },
        }
    }

    pub fn to_row(&self) -> CommentRow {
        CommentRow {
            nickname: self.nickname.clone(),
            digg_count: self.like_count,
            formatted_time: self.created_at.with_timezone(&Local).format(TIME_FORMAT).to_string(),
            text: Some(self.text.clone()),
        }
    }
}

impl CommentPage {
    pub fn comments(&self) -> &[Value] {
        self.comments.as_deref().unwrap_or(&[])
    }

    pub fn has_more(&self) -> bool {
        self.has_more.map(|v| v != 0).unwrap_or(true)
    }

    pub fn cursor(&self) -> Option<u64> {
        self.cursor
    }
}

impl CommentRow {
    /// Text of the row, or `None` when the comment cell is missing or blank.
    pub fn comment_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|v| !v.trim().is_empty())
    }
}

pub fn into_comment_record(value: &Value) -> Result<CommentRecord, MalformedRecord> {
    let raw: RawComment = serde_json::from_value(value.clone())
        .map_err(|err| MalformedRecord::new(err.to_string()))?;

    let text = raw.text
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| MalformedRecord::new("missing comment text"))?;
    let nickname = raw.user
        .and_then(|user| user.nickname)
        .ok_or_else(|| MalformedRecord::new("missing user nickname"))?;
    let created_at = raw.create_time
        .and_then(|seconds| Utc.timestamp_opt(seconds, 0).single())
        .ok_or_else(|| MalformedRecord::new("missing or invalid create_time"))?;
    let like_count = u64::try_from(raw.digg_count.unwrap_or(0))
        .map_err(|_| MalformedRecord::new("negative digg_count"))?;

    let record = CommentRecord::builder()
        .nickname(nickname)
        .text(text)
        .like_count(like_count)
        .created_at(created_at);

    // cid is a string in most payloads but some endpoints send it as a number
    Ok(match raw.cid.as_ref().and_then(cid_to_string) {
        Some(id) => record.id(id).build(),
        None => record.build(),
    })
}

fn cid_to_string(cid: &Value) -> Option<String> {
    match cid {
        Value::String(v) if !v.is_empty() => Some(v.clone()),
        Value::Number(v) => Some(v.to_string()),
        _ => None,
    }
}
