//! Remote clients for the market-data directory, the reel directory, and reel uploads.

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Reel, StockIdentifier, StockOption, VideoFile},
    error::ReelsApiError,
    protocol::{
        MostActiveByIndexRequest, MostActiveByIndexResponse, ReelRecord, UPLOAD_PART_CAPTION,
        UPLOAD_PART_FILE, UPLOAD_PART_STOCK_IDENTIFIER,
    },
};
use tracing::{debug, info};

use crate::config::ClientSettings;

#[async_trait]
pub trait ReelsApi: Send + Sync {
    /// Tradable instruments in the order the market-data service returns them.
    async fn fetch_stocks(&self) -> Result<Vec<StockOption>, ReelsApiError>;

    /// Every reel stored server-side, unfiltered.
    async fn fetch_reels(&self) -> Result<Vec<Reel>, ReelsApiError>;

    /// Single multipart submission. Callers validate the arguments.
    async fn upload_reel(
        &self,
        file: &VideoFile,
        caption: &str,
        stock_identifier: &StockIdentifier,
    ) -> Result<(), ReelsApiError>;
}

pub struct HttpReelsApi {
    http: Client,
    market_data_url: String,
    reels_list_url: String,
    reel_upload_url: String,
    market_query: MostActiveByIndexRequest,
}

impl HttpReelsApi {
    pub fn new(settings: &ClientSettings) -> Result<Self, ReelsApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(transport_error)?;
        Ok(Self::with_client(http, settings))
    }

    pub fn with_client(http: Client, settings: &ClientSettings) -> Self {
        Self {
            http,
            market_data_url: settings.market_data_url.clone(),
            reels_list_url: settings.reels_list_url.clone(),
            reel_upload_url: settings.reel_upload_url.clone(),
            market_query: MostActiveByIndexRequest {
                index_id: settings.index_id,
                segment_id: settings.segment_id,
                market_data_type: settings.market_data_type,
            },
        }
    }
}

#[async_trait]
impl ReelsApi for HttpReelsApi {
    async fn fetch_stocks(&self) -> Result<Vec<StockOption>, ReelsApiError> {
        let response = self
            .http
            .post(&self.market_data_url)
            .json(&self.market_query)
            .send()
            .await
            .map_err(transport_error)?;
        let body: MostActiveByIndexResponse = decode_success(response).await?;

        let segment_id = self.market_query.segment_id;
        let stocks: Vec<StockOption> = body
            .response
            .most_active_list
            .into_iter()
            .map(|entry| entry.into_stock_option(segment_id))
            .collect();
        info!(count = stocks.len(), "stock directory fetched");
        Ok(stocks)
    }

    async fn fetch_reels(&self) -> Result<Vec<Reel>, ReelsApiError> {
        let response = self
            .http
            .get(&self.reels_list_url)
            .send()
            .await
            .map_err(transport_error)?;
        let records: Vec<ReelRecord> = decode_success(response).await?;

        let reels: Vec<Reel> = records.into_iter().map(Reel::from).collect();
        info!(count = reels.len(), "reel directory fetched");
        Ok(reels)
    }

    async fn upload_reel(
        &self,
        file: &VideoFile,
        caption: &str,
        stock_identifier: &StockIdentifier,
    ) -> Result<(), ReelsApiError> {
        let mut file_part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        if let Some(mime_type) = &file.mime_type {
            file_part = file_part.mime_str(mime_type).map_err(transport_error)?;
        }
        let form = Form::new()
            .part(UPLOAD_PART_FILE, file_part)
            .text(UPLOAD_PART_CAPTION, caption.to_string())
            .text(UPLOAD_PART_STOCK_IDENTIFIER, stock_identifier.to_string());

        debug!(
            file_name = %file.file_name,
            size_bytes = file.size_bytes(),
            stock_identifier = %stock_identifier,
            "uploading reel"
        );
        let response = self
            .http
            .post(&self.reel_upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;
        ensure_success(response).await?;
        info!(file_name = %file.file_name, "reel upload accepted");
        Ok(())
    }
}

fn transport_error(err: reqwest::Error) -> ReelsApiError {
    if err.is_decode() {
        ReelsApiError::Decode(err.to_string())
    } else {
        ReelsApiError::Transport(err.to_string())
    }
}

async fn ensure_success(response: Response) -> Result<Response, ReelsApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ReelsApiError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn decode_success<T: DeserializeOwned>(response: Response) -> Result<T, ReelsApiError> {
    let response = ensure_success(response).await?;
    let bytes = response.bytes().await.map_err(transport_error)?;
    serde_json::from_slice(&bytes).map_err(|err| ReelsApiError::Decode(err.to_string()))
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
