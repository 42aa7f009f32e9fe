//! Boundaries to the two external collaborators: a service that compiles drawing markup to
//! an image, and a text service that answers free-form drawing prompts.
//!
//! Transports are left to implementors. This module fixes the wire format and turns
//! replies into either a result or a [`TabvarError`] a human can act on.

use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use crate::{CollaboratorSnafu, TabvarError, markup};

/// Fixed options sent with every compile request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    pub mode: String,
    pub format: String,
    /// Resolution in dots per inch.
    pub density: u32,
    pub transparent: bool,
    pub return_log: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            mode: "auto".to_owned(),
            format: "png".to_owned(),
            density: 300,
            transparent: true,
            return_log: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub source: String,
    #[serde(flatten)]
    pub options: RenderOptions,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderResponse {
    #[serde(default = "succeeded")]
    pub ok: bool,
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub log: Option<String>,
}

fn succeeded() -> bool {
    true
}

impl RenderResponse {
    /// The most useful line to show for a failed compile: the first TeX error line of the
    /// log, else the service's own detail.
    pub fn diagnostic(&self) -> String {
        let first_error = self
            .log
            .as_deref()
            .and_then(|log| log.lines().find(|line| line.starts_with('!')));
        first_error
            .or(self.detail.as_deref())
            .unwrap_or("unknown error")
            .to_owned()
    }
}

pub trait RenderService {
    /// Transport failures are reported as [`TabvarError::Collaborator`].
    fn compile(&self, request: &RenderRequest) -> Result<RenderResponse, TabvarError>;
}

pub trait TextService {
    fn complete(&self, prompt: &str) -> Result<String, TabvarError>;
}

/// Extract the drawing region from `text`, compile it, and return the base64 image.
pub fn render_document(
    service: &impl RenderService,
    text: &str,
    options: &RenderOptions,
) -> Result<String, TabvarError> {
    let source = markup::require_region(text)?;
    log::info!("compiling {} bytes of markup", source.len());

    let request = RenderRequest {
        source: source.to_owned(),
        options: options.clone(),
    };
    let response = service.compile(&request)?;

    match response.image_base64 {
        Some(image) if response.ok => {
            log::info!("compiled to {} bytes of base64", image.len());
            Ok(image)
        }
        _ => {
            let detail = response.diagnostic();
            log::info!("compile failed: {detail}");
            CollaboratorSnafu {
                service: "render",
                detail,
            }
            .fail()
        }
    }
}

/// Ask the text service to draw `prompt` and keep only the markup of its answer.
pub fn draw_from_prompt(service: &impl TextService, prompt: &str) -> Result<String, TabvarError> {
    let answer = service.complete(prompt)?;
    log::debug!("text service answered with {} bytes", answer.len());
    markup::require_region(&answer).map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use assertables::{assert_contains, assert_ok};
    use pretty_assertions as pa;

    use super::*;
    use crate::test_utils::init_test_logger;

    struct FakeRenderer {
        reply: RenderResponse,
        seen: RefCell<Vec<RenderRequest>>,
    }

    impl FakeRenderer {
        fn new(reply: RenderResponse) -> Self {
            Self {
                reply,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl RenderService for FakeRenderer {
        fn compile(&self, request: &RenderRequest) -> Result<RenderResponse, TabvarError> {
            self.seen.borrow_mut().push(request.clone());
            Ok(self.reply.clone())
        }
    }

    struct Unreachable;

    impl RenderService for Unreachable {
        fn compile(&self, _: &RenderRequest) -> Result<RenderResponse, TabvarError> {
            CollaboratorSnafu {
                service: "render",
                detail: "connection refused",
            }
            .fail()
        }
    }

    struct CannedText(&'static str);

    impl TextService for CannedText {
        fn complete(&self, _: &str) -> Result<String, TabvarError> {
            Ok(self.0.to_owned())
        }
    }

    const FIGURE: &str = "\\begin{tikzpicture}\\draw (0,0) circle (1);\\end{tikzpicture}";

    #[test]
    fn request_wire_format() {
        let request = RenderRequest {
            source: FIGURE.to_owned(),
            options: RenderOptions::default(),
        };
        pa::assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "source": FIGURE,
                "mode": "auto",
                "format": "png",
                "density": 300,
                "transparent": true,
                "return_log": true,
            })
        );
    }

    #[test]
    fn response_fields_are_optional() {
        let response: RenderResponse =
            serde_json::from_str(r#"{"image_base64": "iVBORw0KGgo="}"#).unwrap();
        assert!(response.ok);
        pa::assert_eq!(response.image_base64.as_deref(), Some("iVBORw0KGgo="));

        let response: RenderResponse =
            serde_json::from_str(r#"{"ok": false, "detail": "latex failed"}"#).unwrap();
        assert!(!response.ok);
        pa::assert_eq!(response.diagnostic(), "latex failed");
    }

    #[test]
    fn only_the_region_is_sent() {
        init_test_logger();
        let renderer = FakeRenderer::new(RenderResponse {
            ok: true,
            image_base64: Some("AAAA".to_owned()),
            ..Default::default()
        });
        let text = format!("Graph of $y=x$.\n\n{FIGURE}\n");
        let image = assert_ok!(render_document(&renderer, &text, &RenderOptions::default()));
        pa::assert_eq!(image, "AAAA");
        pa::assert_eq!(renderer.seen.borrow()[0].source, FIGURE);
    }

    #[test]
    fn first_tex_error_is_reported() {
        let renderer = FakeRenderer::new(RenderResponse {
            ok: false,
            detail: Some("compilation failed".to_owned()),
            log: Some(
                "This is pdfTeX\n! Undefined control sequence.\nl.3 \\drwa\n! Emergency stop."
                    .to_owned(),
            ),
            ..Default::default()
        });
        let err = render_document(&renderer, FIGURE, &RenderOptions::default()).unwrap_err();
        pa::assert_eq!(err.to_string(), "render failed: ! Undefined control sequence.");
    }

    #[test]
    fn detail_then_fallback() {
        let renderer = FakeRenderer::new(RenderResponse {
            ok: false,
            detail: Some("timeout".to_owned()),
            log: Some("no bang lines here".to_owned()),
            ..Default::default()
        });
        let err = render_document(&renderer, FIGURE, &RenderOptions::default()).unwrap_err();
        assert_contains!(err.to_string(), "timeout");

        pa::assert_eq!(RenderResponse::default().diagnostic(), "unknown error");
    }

    #[test]
    fn success_without_an_image_is_a_failure() {
        let renderer = FakeRenderer::new(RenderResponse {
            ok: true,
            ..Default::default()
        });
        assert!(matches!(
            render_document(&renderer, FIGURE, &RenderOptions::default()),
            Err(TabvarError::Collaborator { .. })
        ));
    }

    #[test]
    fn missing_markup_is_not_a_service_failure() {
        let renderer = FakeRenderer::new(RenderResponse::default());
        assert!(matches!(
            render_document(&renderer, "just prose", &RenderOptions::default()),
            Err(TabvarError::NoMarkupFound)
        ));
        assert!(renderer.seen.borrow().is_empty());
    }

    #[test]
    fn transport_errors_pass_through() {
        let err = render_document(&Unreachable, FIGURE, &RenderOptions::default()).unwrap_err();
        pa::assert_eq!(err.to_string(), "render failed: connection refused");
    }

    #[test]
    fn prompt_answers_are_trimmed_to_markup() {
        let service = CannedText(
            "Sure! Here is a circle:\n```latex\n\\begin{tikzpicture}\\draw (0,0) circle (1);\\end{tikzpicture}\n```",
        );
        pa::assert_eq!(draw_from_prompt(&service, "draw a circle").unwrap(), FIGURE);

        let service = CannedText("I am unable to draw that.");
        assert!(matches!(
            draw_from_prompt(&service, "draw a circle"),
            Err(TabvarError::NoMarkupFound)
        ));
    }
}
