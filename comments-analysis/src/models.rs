use {
    serde::Serialize,
    comments_core::{
        models::CommentRow,
        sentiment::{SentimentDistribution, SentimentLabel},
    },
};

/// Comment table row with the sentiment column appended. Unreadable input rows
/// are written with every cell empty so line positions match the input table.
#[derive(Serialize, Debug, Default)]
pub struct LabeledCommentRow {
    #[serde(rename = "昵称")]
    pub nickname: Option<String>,
    #[serde(rename = "点赞数")]
    pub digg_count: Option<u64>,
    #[serde(rename = "时间")]
    pub formatted_time: Option<String>,
    #[serde(rename = "评论")]
    pub text: Option<String>,
    #[serde(rename = "情感倾向")]
    pub sentiment: Option<&'static str>,
}

#[derive(Serialize, Debug)]
pub struct SentimentSummary {
    pub distribution: SentimentDistribution,
    pub excluded_records: Vec<usize>,
}

impl LabeledCommentRow {
    pub fn new(row: &CommentRow, label: Option<SentimentLabel>) -> Self {
        Self {
            nickname: Some(row.nickname.clone()),
            digg_count: Some(row.digg_count),
            formatted_time: Some(row.formatted_time.clone()),
            text: row.text.clone(),
            sentiment: label.map(|v| v.table_value()),
        }
    }

    pub fn unreadable() -> Self {
        Self::default()
    }
}
