use clap::Parser;
use hybrid_ocr_pipeline::hybrid_ocr_core::{
    CommonEngineArgs, ConfigOverrides, ServerBindArgs, build_config_overrides,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Hybrid OCR API Server", long_about = None)]
pub struct Args {
    #[command(flatten)]
    pub engines: CommonEngineArgs,

    #[command(flatten)]
    pub bind: ServerBindArgs,
}

impl From<&Args> for ConfigOverrides {
    fn from(args: &Args) -> Self {
        build_config_overrides(&args.engines, Some(&args.bind))
    }
}
