use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::{debug, warn};

use post_optimizer::config::EnrichmentConfig;
use post_optimizer::error::OptimizerError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub provider: String,
    pub title: String,
    pub url: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentLabel {
    pub kind: String,
    pub score: f64,
    pub keywords: Vec<String>,
}

/// Best-effort extras for a report. Provider failures end up in `notices`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Enrichment {
    pub articles: Vec<Article>,
    pub sentiment: Option<SentimentLabel>,
    pub notices: Vec<String>,
}

#[derive(Clone, Default)]
struct ApiKeys {
    newsapi: Option<String>,
    newsdata: Option<String>,
    twinword: Option<String>,
}

impl ApiKeys {
    fn from_env() -> Self {
        let read = |name: &str| {
            env::var(name)
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .map(decode_key)
        };
        Self {
            newsapi: read("NEWSAPI_KEY"),
            newsdata: read("NEWSDATA_KEY"),
            twinword: read("TWINWORD_KEY"),
        }
    }

    fn any(&self) -> bool {
        self.newsapi.is_some() || self.newsdata.is_some() || self.twinword.is_some()
    }
}

#[derive(Clone)]
pub struct EnrichmentClient {
    client: reqwest::Client,
    keys: ApiKeys,
    config: EnrichmentConfig,
}

impl EnrichmentClient {
    pub fn from_env(config: &EnrichmentConfig) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| format!("failed to build enrichment client: {}", err))?;
        Ok(Self {
            client,
            keys: ApiKeys::from_env(),
            config: config.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.keys.any()
    }

    pub async fn enrich(&self, text: &str) -> Enrichment {
        let mut enrichment = Enrichment::default();
        if !self.keys.any() {
            enrichment.notices.push(
                "Análisis básico sin APIs: añade NEWSAPI_KEY, NEWSDATA_KEY o TWINWORD_KEY para más detalles."
                    .to_string(),
            );
            return enrichment;
        }
        if text.chars().count() <= self.config.min_text_chars {
            enrichment
                .notices
                .push("Texto demasiado corto para enriquecimiento.".to_string());
            return enrichment;
        }

        let query: String = text.chars().take(self.config.query_chars).collect();
        let (newsapi, newsdata, sentiment) = tokio::join!(
            self.fetch_newsapi(&query),
            self.fetch_newsdata(&query),
            self.fetch_sentiment(text),
        );

        for result in [newsapi, newsdata].into_iter().flatten() {
            match result {
                Ok(articles) => enrichment.articles.extend(articles),
                Err(err) => record_failure(&mut enrichment, err),
            }
        }
        match sentiment {
            Some(Ok(label)) => enrichment.sentiment = label,
            Some(Err(err)) => record_failure(&mut enrichment, err),
            None => {}
        }

        if enrichment.articles.is_empty() && enrichment.sentiment.is_none() && enrichment.notices.is_empty() {
            enrichment.notices.push(
                "No se pudo obtener enriquecimiento. Análisis básico procediendo.".to_string(),
            );
        }
        debug!(
            articles = enrichment.articles.len(),
            sentiment = enrichment.sentiment.is_some(),
            "enrichment finished"
        );
        enrichment
    }

    async fn fetch_newsapi(&self, query: &str) -> Option<Result<Vec<Article>, OptimizerError>> {
        let key = self.keys.newsapi.as_deref()?;
        let page_size = self.config.max_articles.to_string();
        let request = self
            .client
            .get(format!("{}/everything", self.config.newsapi_base.trim_end_matches('/')))
            .query(&[
                ("q", query),
                ("language", self.config.language.as_str()),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
                ("apiKey", key),
            ]);
        let result = self
            .get_json::<NewsApiResponse>("NewsAPI.org", request)
            .await
            .map(|body| newsapi_articles(body, self.config.max_articles));
        Some(result)
    }

    async fn fetch_newsdata(&self, query: &str) -> Option<Result<Vec<Article>, OptimizerError>> {
        let key = self.keys.newsdata.as_deref()?;
        let request = self
            .client
            .get(format!("{}/news", self.config.newsdata_base.trim_end_matches('/')))
            .query(&[
                ("apikey", key),
                ("q", query),
                ("language", self.config.language.as_str()),
            ]);
        let result = self
            .get_json::<NewsDataResponse>("NewsData.io", request)
            .await
            .map(|body| newsdata_articles(body, self.config.max_articles));
        Some(result)
    }

    async fn fetch_sentiment(
        &self,
        text: &str,
    ) -> Option<Result<Option<SentimentLabel>, OptimizerError>> {
        let key = self.keys.twinword.as_deref()?;
        let request = self
            .client
            .get(format!(
                "{}/sentiment/analyze/latest/",
                self.config.twinword_base.trim_end_matches('/')
            ))
            .query(&[("text", text), ("token", key)]);
        let result = self
            .get_json::<TwinwordResponse>("Twinword", request)
            .await
            .map(sentiment_label);
        Some(result)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        provider: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, OptimizerError> {
        let response = request
            .send()
            .await
            .map_err(|err| unavailable(provider, format!("request failed: {}", err)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let detail = error_body.trim();
            if detail.is_empty() {
                return Err(unavailable(provider, format!("status {}", status)));
            }
            return Err(unavailable(provider, format!("status {} {}", status, detail)));
        }

        response
            .json::<T>()
            .await
            .map_err(|err| unavailable(provider, format!("response parse failed: {}", err)))
    }
}

fn record_failure(enrichment: &mut Enrichment, err: OptimizerError) {
    warn!(error = %err, "enrichment provider failed");
    enrichment
        .notices
        .push(format!("{}. Verifica key o conexión.", err));
}

fn unavailable(provider: &str, reason: String) -> OptimizerError {
    OptimizerError::EnrichmentUnavailable {
        provider: provider.to_string(),
        reason,
    }
}

fn decode_key(value: String) -> String {
    if value.contains('%') {
        match urlencoding::decode(&value) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => value,
        }
    } else {
        value
    }
}

#[derive(Deserialize)]
struct NewsApiResponse {
    status: String,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Deserialize)]
struct NewsApiArticle {
    title: Option<String>,
    url: Option<String>,
    source: Option<NewsApiSource>,
}

#[derive(Deserialize)]
struct NewsApiSource {
    name: Option<String>,
}

#[derive(Deserialize)]
struct NewsDataResponse {
    status: String,
    #[serde(default)]
    results: Vec<NewsDataArticle>,
}

#[derive(Deserialize)]
struct NewsDataArticle {
    title: Option<String>,
    link: Option<String>,
    source_id: Option<String>,
}

#[derive(Deserialize)]
struct TwinwordResponse {
    #[serde(rename = "type")]
    kind: Option<String>,
    score: Option<f64>,
    #[serde(default)]
    keywords: Vec<TwinwordKeyword>,
}

#[derive(Deserialize)]
struct TwinwordKeyword {
    word: String,
}

fn newsapi_articles(body: NewsApiResponse, limit: usize) -> Vec<Article> {
    if body.status != "ok" {
        return Vec::new();
    }
    body.articles
        .into_iter()
        .filter_map(|article| {
            Some(Article {
                provider: "NewsAPI.org".to_string(),
                title: article.title?,
                url: article.url?,
                source: article
                    .source
                    .and_then(|source| source.name)
                    .unwrap_or_default(),
            })
        })
        .take(limit)
        .collect()
}

fn newsdata_articles(body: NewsDataResponse, limit: usize) -> Vec<Article> {
    if body.status != "success" {
        return Vec::new();
    }
    body.results
        .into_iter()
        .filter_map(|article| {
            Some(Article {
                provider: "NewsData.io".to_string(),
                title: article.title?,
                url: article.link?,
                source: article.source_id.unwrap_or_default(),
            })
        })
        .take(limit)
        .collect()
}

fn sentiment_label(body: TwinwordResponse) -> Option<SentimentLabel> {
    let kind = body.kind?;
    Some(SentimentLabel {
        kind,
        score: body.score.unwrap_or(0.0),
        keywords: body.keywords.into_iter().map(|keyword| keyword.word).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newsapi_payload_keeps_complete_articles_up_to_limit() {
        let body: NewsApiResponse = serde_json::from_str(
            r#"{"status":"ok","articles":[
                {"title":"Uno","url":"https://a.es/1","source":{"name":"A"}},
                {"title":null,"url":"https://a.es/2","source":{"name":"A"}},
                {"title":"Tres","url":"https://b.es/3","source":null},
                {"title":"Cuatro","url":"https://b.es/4","source":{"name":"B"}}
            ]}"#,
        )
        .unwrap();

        let articles = newsapi_articles(body, 2);

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "Uno");
        assert_eq!(articles[1].title, "Tres");
        assert_eq!(articles[1].source, "");
    }

    #[test]
    fn newsdata_error_status_yields_no_articles() {
        let body: NewsDataResponse =
            serde_json::from_str(r#"{"status":"error","results":[{"title":"x","link":"y"}]}"#)
                .unwrap();
        assert!(newsdata_articles(body, 3).is_empty());
    }

    #[test]
    fn twinword_payload_maps_to_label() {
        let body: TwinwordResponse = serde_json::from_str(
            r#"{"type":"positive","score":0.41,"keywords":[{"word":"genial","score":0.9}]}"#,
        )
        .unwrap();

        let label = sentiment_label(body).unwrap();

        assert_eq!(label.kind, "positive");
        assert_eq!(label.keywords, vec!["genial".to_string()]);
    }

    #[test]
    fn percent_encoded_keys_are_decoded() {
        assert_eq!(decode_key("abc%3D".to_string()), "abc=");
        assert_eq!(decode_key("plain".to_string()), "plain");
    }

    #[tokio::test]
    async fn enrich_without_keys_degrades_to_notice() {
        let client = EnrichmentClient {
            client: reqwest::Client::new(),
            keys: ApiKeys::default(),
            config: EnrichmentConfig::default(),
        };

        let enrichment = client.enrich("Un texto suficientemente largo para consultar").await;

        assert!(enrichment.articles.is_empty());
        assert!(enrichment.sentiment.is_none());
        assert_eq!(enrichment.notices.len(), 1);
    }

    #[tokio::test]
    async fn unreachable_provider_becomes_a_notice() {
        let config = EnrichmentConfig {
            timeout_ms: 500,
            newsapi_base: "http://127.0.0.1:1".to_string(),
            ..EnrichmentConfig::default()
        };
        let client = EnrichmentClient {
            client: reqwest::Client::builder()
                .timeout(Duration::from_millis(config.timeout_ms))
                .build()
                .unwrap(),
            keys: ApiKeys {
                newsapi: Some("test-key".to_string()),
                ..ApiKeys::default()
            },
            config,
        };

        let enrichment = client.enrich("Un texto suficientemente largo para consultar").await;

        assert!(enrichment.articles.is_empty());
        assert!(enrichment.sentiment.is_none());
        assert_eq!(enrichment.notices.len(), 1);
        assert!(enrichment.notices[0].starts_with("NewsAPI.org unavailable"));
    }
}
