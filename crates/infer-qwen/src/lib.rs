pub mod wire;

use std::io::Cursor;

use anyhow::{Context, Result, ensure};
use base64::Engine;
use hybrid_ocr_core::{VisionBackend, VisionSettings};
use image::DynamicImage;
use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::wire::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ImageUrl, MessagePart};

/// Qwen2.5-VL behind the vision backend interface.
///
/// 设计目标：
/// - 权重与推理留在外部的 OpenAI 兼容运行时里，这边只是它的窄客户端；
/// - 一次加载探测 `/v1/models`：端点不可达视为初始化失败，由适配层
///   记为进程生命周期内不可用。
pub struct QwenBackend {
    client: Client,
    chat_url: String,
    model: String,
    api_key: Option<String>,
    max_new_tokens: u32,
}

pub fn load_backend(settings: &VisionSettings) -> Result<Box<dyn VisionBackend>> {
    let client = Client::builder()
        // Bound each HTTP call so an abandoned worker thread does not
        // outlive the orchestrator deadline for long.
        .timeout(settings.timeout())
        .build()
        .context("failed to build vision endpoint client")?;

    let base = settings.endpoint.trim_end_matches('/');
    probe_endpoint(&client, base, settings.api_key.as_deref())?;

    info!(
        endpoint = %settings.endpoint,
        model = %settings.model,
        "vision engine endpoint is reachable"
    );

    Ok(Box::new(QwenBackend {
        client,
        chat_url: format!("{base}/v1/chat/completions"),
        model: settings.model.clone(),
        api_key: settings.api_key.clone(),
        max_new_tokens: settings.max_new_tokens,
    }))
}

fn probe_endpoint(client: &Client, base: &str, api_key: Option<&str>) -> Result<()> {
    let mut request = client.get(format!("{base}/v1/models"));
    if let Some(key) = api_key {
        request = request.bearer_auth(key);
    }
    request
        .send()
        .with_context(|| format!("vision endpoint {base} is unreachable"))?
        .error_for_status()
        .with_context(|| format!("vision endpoint {base} rejected the models probe"))?;
    Ok(())
}

impl VisionBackend for QwenBackend {
    fn model(&self) -> &str {
        &self.model
    }

    fn transcribe(&mut self, image: &DynamicImage, prompt: &str) -> Result<String> {
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    MessagePart::ImageUrl {
                        image_url: ImageUrl {
                            url: encode_image_data_url(image)?,
                        },
                    },
                    MessagePart::Text { text: prompt },
                ],
            }],
            max_tokens: self.max_new_tokens,
            temperature: 0.0,
        };

        let mut request = self.client.post(&self.chat_url).json(&payload);
        if let Some(key) = self.api_key.as_deref() {
            request = request.bearer_auth(key);
        }

        let response: ChatCompletionResponse = request
            .send()
            .context("vision endpoint request failed")?
            .error_for_status()
            .context("vision endpoint returned an error status")?
            .json()
            .context("vision endpoint returned a malformed completion")?;

        let text = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();
        let text = text.trim().to_string();
        ensure!(
            !text.is_empty(),
            "model returned empty output for the transcription prompt"
        );

        debug!(chars = text.len(), "vision transcription finished");
        Ok(text)
    }
}

/// Encode an image as a PNG base64 `data:` URL.
pub fn encode_image_data_url(image: &DynamicImage) -> Result<String> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .context("failed to encode image as PNG")?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
    Ok(format!("data:image/png;base64,{encoded}"))
}
