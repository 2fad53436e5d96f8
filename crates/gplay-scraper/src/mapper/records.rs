//! [`Record`] impls: field names → typed struct members.

use crate::error::ScraperError;
use crate::types::{
    AppDetails, DataSafetyEntry, Review, SearchResult, SecurityPractice, SimilarApp,
};

use super::{MappedRecord, Record};

/// `free` is only known when the price position was present.
fn free_from_price(price: Option<f64>) -> Option<bool> {
    price.map(|p| p.abs() < f64::EPSILON)
}

impl Record for AppDetails {
    fn from_fields(f: &MappedRecord<'_>) -> Result<Self, ScraperError> {
        let price = f.num("price");
        let iap_range = f.str("iap_range");
        Ok(Self {
            app_id: f.required_str("app_id")?,
            title: f.required_str("title")?,
            description: f.str("description"),
            description_html: f.str("description_html"),
            summary: f.str("summary"),
            installs: f.str("installs"),
            min_installs: f.count("min_installs"),
            real_installs: f.count("real_installs"),
            score: f.num("score"),
            ratings: f.count("ratings"),
            reviews: f.count("reviews"),
            histogram: [
                f.count("histogram_1"),
                f.count("histogram_2"),
                f.count("histogram_3"),
                f.count("histogram_4"),
                f.count("histogram_5"),
            ],
            price,
            free: free_from_price(price),
            currency: f.str("currency"),
            offers_iap: iap_range.is_some(),
            iap_range,
            developer: f.str("developer"),
            developer_id: f.str("developer_id"),
            developer_email: f.str("developer_email"),
            developer_website: f.str("developer_website"),
            developer_address: f.str("developer_address"),
            privacy_policy: f.str("privacy_policy"),
            genre: f.str("genre"),
            genre_id: f.str("genre_id"),
            icon: f.str("icon"),
            header_image: f.str("header_image"),
            screenshots: f.list("screenshots"),
            video: f.str("video"),
            video_image: f.str("video_image"),
            content_rating: f.str("content_rating"),
            content_rating_description: f.str("content_rating_description"),
            ad_supported: f.bool("ad_supported").unwrap_or(false),
            released: f.str("released"),
            updated: f.timestamp("updated"),
            version: f.str("version"),
            android_version: f.str("android_version"),
            recent_changes: f.str("recent_changes"),
            url: None,
        })
    }
}

impl Record for SearchResult {
    fn from_fields(f: &MappedRecord<'_>) -> Result<Self, ScraperError> {
        let price = f.num("price");
        Ok(Self {
            app_id: f.required_str("app_id")?,
            title: f.required_str("title")?,
            icon: f.str("icon"),
            screenshots: f.list("screenshots"),
            score: f.num("score"),
            genre: f.str("genre"),
            price,
            free: free_from_price(price),
            currency: f.str("currency"),
            video: f.str("video"),
            video_image: f.str("video_image"),
            description: f.str("description"),
            description_html: f.str("description_html"),
            developer: f.str("developer"),
            installs: f.str("installs"),
        })
    }
}

impl Record for Review {
    fn from_fields(f: &MappedRecord<'_>) -> Result<Self, ScraperError> {
        Ok(Self {
            review_id: f.required_str("review_id")?,
            user_name: f.str("user_name"),
            user_image: f.str("user_image"),
            content: f.str("content"),
            score: f
                .int("score")
                .and_then(|s| u8::try_from(s).ok())
                .filter(|s| (1..=5).contains(s)),
            thumbs_up_count: f.count("thumbs_up_count"),
            review_created_version: f.str("review_created_version"),
            at: f.timestamp("at"),
            reply_content: f.str("reply_content"),
            replied_at: f.timestamp("replied_at"),
            app_version: f.str("app_version"),
        })
    }
}

impl Record for DataSafetyEntry {
    fn from_fields(f: &MappedRecord<'_>) -> Result<Self, ScraperError> {
        Ok(Self {
            category: f.str("category"),
            data_type: f.required_str("data_type")?,
            optional: f.bool("optional").unwrap_or(false),
            purpose: f.str("purpose"),
        })
    }
}

impl Record for SecurityPractice {
    fn from_fields(f: &MappedRecord<'_>) -> Result<Self, ScraperError> {
        Ok(Self {
            practice: f.required_str("practice")?,
            description: f.str("description"),
        })
    }
}

impl Record for SimilarApp {
    fn from_fields(f: &MappedRecord<'_>) -> Result<Self, ScraperError> {
        let price = f.num("price");
        Ok(Self {
            app_id: f.required_str("app_id")?,
            title: f.str("title"),
            icon: f.str("icon"),
            developer: f.str("developer"),
            score: f.num("score"),
            price,
            free: free_from_price(price),
            currency: f.str("currency"),
            description: f.str("description"),
        })
    }
}
