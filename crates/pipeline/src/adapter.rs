use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use hybrid_ocr_core::{
    ClassicalBackend, ClassicalSettings, EngineError, EngineKind, EngineResult, EngineStatus,
    LanguageHint, RawOutput, VisionBackend, VisionSettings,
};
use image::DynamicImage;
use tracing::info;

use crate::progress::ProgressSink;

/// Uniform capability wrapper around one OCR backend.
///
/// 设计目标：
/// - 规划与编排只依赖这一个接口；提示词、输出形状、预算等差异留在实现里；
/// - `recognize` 是阻塞调用，由编排器放到 blocking 线程并施加各引擎自己的
///   wall-clock 预算。
pub trait EngineCapability: Send + Sync {
    fn kind(&self) -> EngineKind;

    /// Wall-clock budget for one invocation (lazy first-call load included).
    fn budget(&self) -> Duration;

    fn status(&self) -> EngineStatus;

    fn is_available(&self) -> bool {
        self.status().is_available()
    }

    /// Load the backend eagerly instead of on the first request.
    fn warm_up(&self, progress: &dyn ProgressSink) -> Result<(), EngineError>;

    fn recognize(
        &self,
        image: &DynamicImage,
        language: &LanguageHint,
        progress: &dyn ProgressSink,
    ) -> Result<EngineResult, EngineError>;
}

/// Deferred backend constructor; consumed by the first load.
pub type Loader<B> = Box<dyn FnOnce() -> anyhow::Result<Box<B>> + Send>;

enum LoadState<B: ?Sized> {
    Unloaded(Option<Loader<B>>),
    Loading,
    Ready(Arc<Mutex<Box<B>>>),
    Failed(String),
}

enum LoadAction<B: ?Sized> {
    UseReady(Arc<Mutex<Box<B>>>),
    Fail(String),
    Load(Loader<B>),
}

/// Singleflight lazy-load cell shared by both adapters.
///
/// 状态机：`Unloaded → Loading → Ready | Failed`。第一个调用者执行加载，
/// 并发调用者在 condvar 上等待；加载失败会被缓存为 `Failed`，进程生命周期内
/// 不再重试。
struct BackendCell<B: ?Sized> {
    state: Mutex<LoadState<B>>,
    cv: Condvar,
}

impl<B: ?Sized> BackendCell<B> {
    fn new(loader: Loader<B>) -> Self {
        Self {
            state: Mutex::new(LoadState::Unloaded(Some(loader))),
            cv: Condvar::new(),
        }
    }

    fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(LoadState::Failed(reason.into())),
            cv: Condvar::new(),
        }
    }

    fn status(&self) -> EngineStatus {
        let state = self
            .state
            .lock()
            .expect("backend cell mutex poisoning detected");
        match &*state {
            LoadState::Unloaded(_) | LoadState::Loading => EngineStatus::NotLoaded,
            LoadState::Ready(_) => EngineStatus::Loaded,
            LoadState::Failed(reason) => EngineStatus::Unavailable {
                reason: reason.clone(),
            },
        }
    }

    /// Return the loaded backend, loading it on the first call.
    ///
    /// `on_load` runs only for the caller that actually performs the load,
    /// outside the cell lock, so it may emit progress.
    fn ensure_loaded(
        &self,
        on_load: impl FnOnce(),
    ) -> Result<Arc<Mutex<Box<B>>>, EngineError> {
        let mut state = self
            .state
            .lock()
            .expect("backend cell mutex poisoning detected");
        let action = loop {
            match &mut *state {
                LoadState::Ready(handle) => break LoadAction::UseReady(Arc::clone(handle)),
                LoadState::Failed(reason) => break LoadAction::Fail(reason.clone()),
                LoadState::Loading => {
                    state = self
                        .cv
                        .wait(state)
                        .expect("backend cell wait poisoning detected");
                }
                LoadState::Unloaded(loader) => {
                    let loader = loader.take().expect("backend loader already taken");
                    *state = LoadState::Loading;
                    break LoadAction::Load(loader);
                }
            }
        };
        drop(state);

        match action {
            LoadAction::UseReady(handle) => Ok(handle),
            LoadAction::Fail(reason) => Err(EngineError::unavailable(reason)),
            LoadAction::Load(loader) => {
                on_load();
                let loaded = loader();
                let mut state = self
                    .state
                    .lock()
                    .expect("backend cell mutex poisoning detected");
                let result = match loaded {
                    Ok(backend) => {
                        let handle = Arc::new(Mutex::new(backend));
                        *state = LoadState::Ready(Arc::clone(&handle));
                        Ok(handle)
                    }
                    Err(err) => {
                        let reason = format!("{err:#}");
                        *state = LoadState::Failed(reason.clone());
                        Err(EngineError::unavailable(reason))
                    }
                };
                self.cv.notify_all();
                result
            }
        }
    }
}

/// Vision-language engine adapter.
pub struct VisionEngine {
    cell: BackendCell<dyn VisionBackend>,
    budget: Duration,
    max_edge: u32,
}

impl VisionEngine {
    pub fn new(settings: &VisionSettings) -> Self {
        if !settings.enabled {
            return Self {
                cell: BackendCell::unavailable("disabled in configuration"),
                budget: settings.timeout(),
                max_edge: settings.max_edge,
            };
        }
        let loader_settings = settings.clone();
        Self {
            cell: BackendCell::new(Box::new(move || {
                hybrid_ocr_infer_qwen::load_backend(&loader_settings)
            })),
            budget: settings.timeout(),
            max_edge: settings.max_edge,
        }
    }

    /// Adapter with a caller-provided loader; used by tests.
    pub fn with_loader(budget: Duration, max_edge: u32, loader: Loader<dyn VisionBackend>) -> Self {
        Self {
            cell: BackendCell::new(loader),
            budget,
            max_edge,
        }
    }

    fn ocr_prompt(language: &LanguageHint) -> &'static str {
        if language.uses_arabic_script() {
            "What is the text written in this image? Please transcribe all text \
             accurately, including any Arabic or Urdu text."
        } else {
            "What is the text written in this image? Please transcribe all text accurately."
        }
    }
}

impl EngineCapability for VisionEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Qwen
    }

    fn budget(&self) -> Duration {
        self.budget
    }

    fn status(&self) -> EngineStatus {
        self.cell.status()
    }

    fn warm_up(&self, progress: &dyn ProgressSink) -> Result<(), EngineError> {
        self.cell
            .ensure_loaded(|| progress.emit("loading vision-language model", 10))
            .map(|_| ())
    }

    fn recognize(
        &self,
        image: &DynamicImage,
        language: &LanguageHint,
        progress: &dyn ProgressSink,
    ) -> Result<EngineResult, EngineError> {
        let started = Instant::now();
        progress.emit("initialising Qwen2.5-VL", 0);

        let backend = self
            .cell
            .ensure_loaded(|| progress.emit("loading vision-language model", 10))?;

        // Large pages blow up the vision token budget; cap the longer edge.
        let resized;
        let image = if image.width().max(image.height()) > self.max_edge {
            resized = image.resize(
                self.max_edge,
                self.max_edge,
                image::imageops::FilterType::Lanczos3,
            );
            info!(
                width = resized.width(),
                height = resized.height(),
                "downscaled image for vision inference"
            );
            &resized
        } else {
            image
        };
        progress.emit("processing image", 70);

        progress.emit("generating text", 80);
        let mut guard = backend
            .lock()
            .map_err(|_| EngineError::inference("vision backend mutex is poisoned"))?;
        let model = guard.model().to_string();
        let text = guard
            .transcribe(image, Self::ocr_prompt(language))
            .map_err(|err| EngineError::inference(format!("{err:#}")))?;
        drop(guard);

        progress.emit("Qwen2.5-VL completed", 100);
        Ok(EngineResult {
            engine: EngineKind::Qwen,
            model,
            output: RawOutput::Vision { text },
            duration: started.elapsed(),
        })
    }
}

/// Classical detector/recognizer engine adapter.
pub struct ClassicalEngine {
    cell: BackendCell<dyn ClassicalBackend>,
    budget: Duration,
}

impl ClassicalEngine {
    pub fn new(settings: &ClassicalSettings) -> Self {
        if !settings.enabled {
            return Self {
                cell: BackendCell::unavailable("disabled in configuration"),
                budget: settings.timeout(),
            };
        }
        let loader_settings = settings.clone();
        Self {
            cell: BackendCell::new(Box::new(move || {
                hybrid_ocr_infer_paddle::load_backend(&loader_settings)
            })),
            budget: settings.timeout(),
        }
    }

    /// Adapter with a caller-provided loader; used by tests.
    pub fn with_loader(budget: Duration, loader: Loader<dyn ClassicalBackend>) -> Self {
        Self {
            cell: BackendCell::new(loader),
            budget,
        }
    }
}

impl EngineCapability for ClassicalEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Paddle
    }

    fn budget(&self) -> Duration {
        self.budget
    }

    fn status(&self) -> EngineStatus {
        self.cell.status()
    }

    fn warm_up(&self, progress: &dyn ProgressSink) -> Result<(), EngineError> {
        self.cell
            .ensure_loaded(|| progress.emit("loading PaddleOCR model", 20))
            .map(|_| ())
    }

    fn recognize(
        &self,
        image: &DynamicImage,
        _language: &LanguageHint,
        progress: &dyn ProgressSink,
    ) -> Result<EngineResult, EngineError> {
        let started = Instant::now();
        progress.emit("initialising PaddleOCR", 0);

        let backend = self
            .cell
            .ensure_loaded(|| progress.emit("loading PaddleOCR model", 20))?;

        progress.emit("processing image with PaddleOCR", 50);

        progress.emit("running OCR analysis", 70);
        let mut guard = backend
            .lock()
            .map_err(|_| EngineError::inference("classical backend mutex is poisoned"))?;
        let model = guard.model().to_string();
        let regions = guard
            .recognize(image)
            .map_err(|err| EngineError::inference(format!("{err:#}")))?;
        drop(guard);

        progress.emit("processing OCR results", 90);
        progress.emit("PaddleOCR completed", 100);
        Ok(EngineResult {
            engine: EngineKind::Paddle,
            model,
            output: RawOutput::Classical { regions },
            duration: started.elapsed(),
        })
    }
}
