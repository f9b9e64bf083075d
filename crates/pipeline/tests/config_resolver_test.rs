use std::io::Write;

use hybrid_ocr_core::{ClassicalOverride, ConfigOverrides, ServerOverride, VisionOverride};
use hybrid_ocr_pipeline::{ConfigResolver, ConfigSource, PatchLayer};

fn defaults_patch() -> ConfigOverrides {
    ConfigOverrides {
        server: ServerOverride {
            host: Some("127.0.0.1".to_string()),
            port: Some(9000),
        },
        vision: VisionOverride {
            timeout_secs: Some(30),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn later_layers_override_earlier_ones() {
    let mut resolver = ConfigResolver::new();
    resolver.push_layer(PatchLayer::new(ConfigSource::Defaults, defaults_patch()));
    resolver.push_layer(PatchLayer::new(
        ConfigSource::CliArgs,
        ConfigOverrides {
            server: ServerOverride {
                host: None,
                port: Some(9100),
            },
            ..Default::default()
        },
    ));

    let (config, descriptor) = resolver.resolve().expect("resolve");

    // CLI wins on port, defaults layer still contributes the host.
    assert_eq!(config.server.port, 9100);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.vision.timeout_secs, 30);
    assert_eq!(descriptor.display(), "built-in defaults");
}

#[test]
fn absent_fields_fall_back_to_schema_defaults() {
    let resolver = ConfigResolver::new();
    let (config, _) = resolver.resolve().expect("resolve");

    assert_eq!(config.server.port, 8001);
    assert!(config.vision.enabled);
    assert!(config.classical.enabled);
    assert_eq!(config.classical.language, "english");
}

#[test]
fn config_file_layer_reads_toml_and_cli_still_wins() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        r#"
[server]
port = 7005

[classical]
language = "arabic"
timeout_secs = 25
"#
    )
    .expect("write config");

    let mut resolver = ConfigResolver::new();
    resolver.push_layer(PatchLayer::new(
        ConfigSource::ConfigFile,
        ConfigOverrides {
            config_path: Some(file.path().to_path_buf()),
            ..Default::default()
        },
    ));
    resolver.push_layer(PatchLayer::new(
        ConfigSource::CliArgs,
        ConfigOverrides {
            classical: ClassicalOverride {
                language: Some("latin".to_string()),
                ..Default::default()
            },
            ..Default::default()
        },
    ));

    let (config, descriptor) = resolver.resolve().expect("resolve");

    assert_eq!(config.server.port, 7005);
    assert_eq!(config.classical.timeout_secs, 25);
    assert_eq!(config.classical.language, "latin");
    assert_eq!(descriptor.display(), file.path().display().to_string());
}

#[test]
fn merged_patch_keeps_latest_value_per_field() {
    let mut resolver = ConfigResolver::new();
    resolver.push_layer(PatchLayer::new(ConfigSource::Defaults, defaults_patch()));
    resolver.push_layer(PatchLayer::new(
        ConfigSource::ConfigFile,
        ConfigOverrides {
            vision: VisionOverride {
                timeout_secs: Some(45),
                ..Default::default()
            },
            ..Default::default()
        },
    ));

    let merged = resolver.merged_patch().expect("merge");
    assert_eq!(merged.vision.timeout_secs, Some(45));
    assert_eq!(merged.server.port, Some(9000));
}
