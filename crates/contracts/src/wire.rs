//! Wire messages
//!
//! Protobuf messages written to the outbound half of a server-streaming call.
//! Optional fields are `Option` so an absent value is omitted from the encoding
//! instead of being sent as zero.

/// Streamed movie
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GrpcMovie {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub title: String,
    #[prost(string, tag = "3")]
    pub studio: String,
    #[prost(string, tag = "4")]
    pub content_rating: String,
    #[prost(string, tag = "5")]
    pub genres: String,
    #[prost(string, tag = "6")]
    pub tagline: String,
    #[prost(string, tag = "7")]
    pub summary: String,
    #[prost(string, tag = "8")]
    pub directors: String,
    #[prost(string, tag = "9")]
    pub roles: String,
    #[prost(double, optional, tag = "10")]
    pub critics_rating: Option<f64>,
    #[prost(double, optional, tag = "11")]
    pub audience_rating: Option<f64>,
    #[prost(int32, optional, tag = "12")]
    pub year: Option<i32>,
    #[prost(message, optional, tag = "13")]
    pub release_date: Option<::prost_types::Timestamp>,
    #[prost(message, optional, tag = "14")]
    pub duration: Option<::prost_types::Duration>,
}

/// Search call parameters
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SearchRequest {
    #[prost(string, tag = "1")]
    pub search_text: String,
}
