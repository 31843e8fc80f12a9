use backdrop_core::{AbortSignal, AssetFetcher, CaptureError};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

fn fetch_error(e: JsValue) -> CaptureError {
    CaptureError::Fetch(format!("{:?}", e))
}

/// Browser `fetch` bound to an `AbortController`.
pub struct FetchAssets {
    controller: web::AbortController,
}

impl AssetFetcher for FetchAssets {
    async fn fetch(&self, url: &str, signal: &AbortSignal) -> Result<Vec<u8>, CaptureError> {
        if signal.is_aborted() {
            return Err(CaptureError::Aborted);
        }
        let window = web::window().ok_or_else(|| CaptureError::Fetch("no window".into()))?;
        let init = web::RequestInit::new();
        init.set_signal(Some(&self.controller.signal()));
        let response: web::Response = JsFuture::from(window.fetch_with_str_and_init(url, &init))
            .await
            .map_err(fetch_error)?
            .dyn_into()
            .map_err(fetch_error)?;
        if !response.ok() {
            return Err(CaptureError::Http(response.status()));
        }
        let buffer = JsFuture::from(response.array_buffer().map_err(fetch_error)?)
            .await
            .map_err(fetch_error)?;
        let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
        // The decode that follows runs in its own task.
        yield_to_browser().await;
        Ok(bytes)
    }
}

/// Resolve on a fresh macrotask so the browser can present a frame first.
pub async fn yield_to_browser() {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        let scheduled = web::window()
            .map(|w| w.set_timeout_with_callback(&resolve).is_ok())
            .unwrap_or(false);
        if !scheduled {
            _ = resolve.call0(&JsValue::NULL);
        }
    });
    _ = JsFuture::from(promise).await;
}

/// Cancellation for one in-flight capture: flips the shared flag and aborts
/// the network request.
pub struct CaptureHandle {
    signal: AbortSignal,
    controller: web::AbortController,
}

impl CaptureHandle {
    pub fn new() -> anyhow::Result<Self> {
        let controller =
            web::AbortController::new().map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;
        Ok(Self {
            signal: AbortSignal::new(),
            controller,
        })
    }

    pub fn signal(&self) -> AbortSignal {
        self.signal.clone()
    }

    pub fn fetcher(&self) -> FetchAssets {
        FetchAssets {
            controller: self.controller.clone(),
        }
    }

    pub fn abort(&self) {
        self.signal.abort();
        self.controller.abort();
    }
}
