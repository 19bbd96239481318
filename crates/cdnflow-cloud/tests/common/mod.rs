use cdnflow_build::{ArtifactBuilder, BuildError, BuildResult};
use cdnflow_core::{
    CloudFrontConfig, Config, FunctionConfig, KmsConfig, OriginAccessControlConfig,
};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const ACCOUNT: &str = "123456789012";
pub const KEY_ARN: &str =
    "arn:aws:kms:ap-northeast-1:123456789012:key/1234abcd-12ab-34cd-56ef-1234567890ab";
pub const FUNCTION_ARN: &str = "arn:aws:cloudfront::123456789012:function/forward";
pub const HANDLER: &str = "function handler(event) { return event.request; }";

/// ビルドを記録し、成果物を書き出すだけのビルダー
pub struct RecordingBuilder {
    pub root: TempDir,
    pub prepared: RefCell<Vec<PathBuf>>,
    fail: bool,
}

impl RecordingBuilder {
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
            prepared: RefCell::new(Vec::new()),
            fail: false,
        }
    }

    #[allow(dead_code)]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn build_count(&self) -> usize {
        self.prepared.borrow().len()
    }
}

impl ArtifactBuilder for RecordingBuilder {
    fn prepare(&self, targets: &[PathBuf]) -> BuildResult<()> {
        for target in targets {
            self.prepared.borrow_mut().push(target.clone());
            if self.fail {
                return Err(BuildError::CommandFailed {
                    command: "yarn build".to_string(),
                    dir: self.root.path().join(target),
                    code: Some(1),
                });
            }
            let dir = self.root.path().join(target);
            fs::create_dir_all(&dir)?;
            fs::write(dir.join("index.js"), HANDLER)?;
        }
        Ok(())
    }

    fn artifact_path(&self, target: &Path) -> PathBuf {
        self.root.path().join(target).join("index.js")
    }
}

pub fn minimal_config() -> Config {
    Config {
        bucket_name: "site".to_string(),
        account: Some(ACCOUNT.to_string()),
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn with_access_control(config: Config, function: FunctionConfig) -> Config {
    Config {
        cloudfront: CloudFrontConfig {
            comment: "site".to_string(),
            origin_access_control: Some(OriginAccessControlConfig {
                name: "site-oac".to_string(),
                function_config: Some(function),
            }),
        },
        ..config
    }
}

#[allow(dead_code)]
pub fn with_kms(config: Config, kms: KmsConfig) -> Config {
    Config {
        kms: Some(kms),
        ..config
    }
}
