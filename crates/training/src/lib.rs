//! Training-sample ingestion for the classical engine.
//!
//! 这条管线和在线识别完全解耦：接收标注样本、落盘、产出给外部训练任务
//! 消费的清单文件，服务路径不会在请求处理中调用它。

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// One labelled sample submitted for retraining.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSample {
    /// Path to the sample image on disk.
    pub image: PathBuf,
    /// Ground-truth transcription.
    pub text: String,
}

/// Why a sample was rejected during validation.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("image {} is not readable", .0.display())]
    UnreadableImage(PathBuf),

    #[error("image {} is not decodable: {message}", path.display())]
    InvalidImage { path: PathBuf, message: String },

    #[error("ground-truth text for {} is empty", .0.display())]
    EmptyText(PathBuf),
}

/// Manifest artifact describing the image-list/label-list pairing consumed
/// by the external training job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingManifest {
    pub train_list: PathBuf,
    pub val_list: PathBuf,
    pub train_count: usize,
    pub val_count: usize,
    /// Total samples in the workspace after ingestion.
    pub samples: usize,
}

/// Filesystem workspace holding ingested samples.
///
/// Layout (one sample = one image + one label file):
///
/// ```text
/// <root>/
/// ├── images/          # sample_0001.png, …
/// ├── labels/          # sample_0001.txt, …
/// ├── train_list.txt   # image-name<TAB>label
/// ├── val_list.txt
/// └── manifest.json
/// ```
pub struct TrainingWorkspace {
    root: PathBuf,
    images_dir: PathBuf,
    labels_dir: PathBuf,
    validation_split: f32,
}

impl TrainingWorkspace {
    pub fn create(root: impl Into<PathBuf>, validation_split: f32) -> Result<Self> {
        let root = root.into();
        let images_dir = root.join("images");
        let labels_dir = root.join("labels");
        fs::create_dir_all(&images_dir)
            .with_context(|| format!("failed to create {}", images_dir.display()))?;
        fs::create_dir_all(&labels_dir)
            .with_context(|| format!("failed to create {}", labels_dir.display()))?;

        Ok(Self {
            root,
            images_dir,
            labels_dir,
            validation_split: validation_split.clamp(0.0, 0.5),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check one sample without touching the workspace.
    pub fn validate(sample: &TrainingSample) -> Result<(), SampleError> {
        if sample.text.trim().is_empty() {
            return Err(SampleError::EmptyText(sample.image.clone()));
        }

        let reader = image::ImageReader::open(&sample.image)
            .map_err(|_| SampleError::UnreadableImage(sample.image.clone()))?;
        reader
            .with_guessed_format()
            .map_err(|_| SampleError::UnreadableImage(sample.image.clone()))?
            .into_dimensions()
            .map_err(|err| SampleError::InvalidImage {
                path: sample.image.clone(),
                message: err.to_string(),
            })?;

        Ok(())
    }

    /// Ingest a batch and regenerate the data lists and manifest.
    ///
    /// The whole batch is validated before anything is written; one bad
    /// sample rejects the submission.
    pub fn ingest(&self, samples: &[TrainingSample]) -> Result<TrainingManifest> {
        for sample in samples {
            Self::validate(sample)?;
        }

        let mut index = self.next_sample_index()?;
        for sample in samples {
            let name = format!("sample_{index:04}");
            index += 1;

            let extension = sample
                .image
                .extension()
                .and_then(|ext| ext.to_str())
                .unwrap_or("png");
            let image_dest = self.images_dir.join(format!("{name}.{extension}"));
            fs::copy(&sample.image, &image_dest).with_context(|| {
                format!(
                    "failed to copy {} to {}",
                    sample.image.display(),
                    image_dest.display()
                )
            })?;

            let label_dest = self.labels_dir.join(format!("{name}.txt"));
            fs::write(&label_dest, sample.text.trim())
                .with_context(|| format!("failed to write {}", label_dest.display()))?;

            info!(sample = %name, image = %image_dest.display(), "ingested training sample");
        }

        let manifest = self.write_data_lists()?;
        let manifest_path = self.root.join("manifest.json");
        fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)
            .with_context(|| format!("failed to write {}", manifest_path.display()))?;

        Ok(manifest)
    }

    fn next_sample_index(&self) -> Result<usize> {
        Ok(self.image_files()?.len() + 1)
    }

    fn image_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = fs::read_dir(&self.images_dir)
            .with_context(|| format!("failed to list {}", self.images_dir.display()))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect::<Vec<_>>();
        files.sort();
        Ok(files)
    }

    /// Regenerate `train_list.txt` / `val_list.txt` over all ingested
    /// samples, holding out the configured validation fraction.
    fn write_data_lists(&self) -> Result<TrainingManifest> {
        let images = self.image_files()?;
        let split_idx = (images.len() as f32 * (1.0 - self.validation_split)) as usize;
        let (train_files, val_files) = images.split_at(split_idx.min(images.len()));

        let train_list = self.root.join("train_list.txt");
        let val_list = self.root.join("val_list.txt");
        let train_count = self.write_list(&train_list, train_files)?;
        let val_count = self.write_list(&val_list, val_files)?;

        info!(train_count, val_count, "regenerated training data lists");

        Ok(TrainingManifest {
            train_list,
            val_list,
            train_count,
            val_count,
            samples: images.len(),
        })
    }

    fn write_list(&self, list_path: &Path, images: &[PathBuf]) -> Result<usize> {
        let mut lines = Vec::new();
        for image in images {
            let Some(stem) = image.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let label_path = self.labels_dir.join(format!("{stem}.txt"));
            // Images without a label file are skipped rather than breaking
            // the whole list.
            let Ok(label) = fs::read_to_string(&label_path) else {
                continue;
            };
            let Some(file_name) = image.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            lines.push(format!("{file_name}\t{}", label.trim()));
        }

        let count = lines.len();
        let mut contents = lines.join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }
        fs::write(list_path, contents)
            .with_context(|| format!("failed to write {}", list_path.display()))?;
        Ok(count)
    }
}
