use crate::config::CompanionConfig;

use super::{IMAGE_ARTIFACT_NAME, TEXT_ARTIFACT_NAME};

/// Which dump file the companion activity produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteArtifactKind {
    Text,
    Image,
}

impl RemoteArtifactKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            RemoteArtifactKind::Text => TEXT_ARTIFACT_NAME,
            RemoteArtifactKind::Image => IMAGE_ARTIFACT_NAME,
        }
    }
}

/// Quote `value` for a POSIX shell.
pub fn shell_quote(value: &str) -> String {
    if !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c))
    {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Shell command lines understood by the companion app.
#[derive(Debug, Clone)]
pub struct CompanionCommands {
    package: String,
    files_dir: String,
    image_push_path: String,
}

impl CompanionCommands {
    pub fn new(config: &CompanionConfig) -> Self {
        Self {
            package: config.package.clone(),
            files_dir: config.files_dir.trim_end_matches('/').to_string(),
            image_push_path: config.image_push_path.clone(),
        }
    }

    pub fn image_push_path(&self) -> &str {
        &self.image_push_path
    }

    pub fn artifact_path(&self, kind: RemoteArtifactKind) -> String {
        format!("{}/{}", self.files_dir, kind.file_name())
    }

    fn write_broadcast(&self) -> String {
        format!(
            "am broadcast -a {pkg}.WRITE -n {pkg}/.WriteReceiver",
            pkg = self.package
        )
    }

    pub fn write_text(&self, text: &str) -> String {
        format!("{} -e text {}", self.write_broadcast(), shell_quote(text))
    }

    pub fn write_image_file(&self) -> String {
        format!(
            "{} -e image_file {}",
            self.write_broadcast(),
            shell_quote(&self.image_push_path)
        )
    }

    /// Remove stale dumps so the next listing only reflects a fresh read.
    pub fn clear_artifacts(&self) -> String {
        format!(
            "rm -f {} {}",
            shell_quote(&self.artifact_path(RemoteArtifactKind::Text)),
            shell_quote(&self.artifact_path(RemoteArtifactKind::Image))
        )
    }

    pub fn request_dump(&self) -> String {
        format!("am start -n {}/.MainActivity", self.package)
    }

    /// Lists whichever dump files exist, one path per line.
    pub fn list_artifacts(&self) -> String {
        format!(
            "ls {} {} 2>/dev/null",
            shell_quote(&self.artifact_path(RemoteArtifactKind::Image)),
            shell_quote(&self.artifact_path(RemoteArtifactKind::Text))
        )
    }

    /// Pick the artifact named in `ls` output. Images win over text, matching
    /// the activity which only writes a text dump when there is no image URI.
    pub fn parse_listing(&self, stdout: &str) -> Option<RemoteArtifactKind> {
        let present = |kind: RemoteArtifactKind| {
            stdout
                .lines()
                .map(str::trim)
                .any(|line| line.ends_with(kind.file_name()) && !line.contains("No such file"))
        };

        if present(RemoteArtifactKind::Image) {
            Some(RemoteArtifactKind::Image)
        } else if present(RemoteArtifactKind::Text) {
            Some(RemoteArtifactKind::Text)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commands() -> CompanionCommands {
        CompanionCommands::new(&CompanionConfig::default())
    }

    #[test]
    fn quotes_only_when_needed() {
        assert_eq!(shell_quote("plain-word_1.txt"), "plain-word_1.txt");
        assert_eq!(shell_quote("hello world"), "'hello world'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote(""), "''");
        assert_eq!(shell_quote("line1\nline2"), "'line1\nline2'");
    }

    #[test]
    fn write_text_targets_receiver() {
        let cmd = commands().write_text("hello $HOME");
        assert_eq!(
            cmd,
            "am broadcast -a com.example.clipboard.WRITE -n com.example.clipboard/.WriteReceiver -e text 'hello $HOME'"
        );
    }

    #[test]
    fn write_image_points_at_push_path() {
        let cmd = commands().write_image_file();
        assert!(cmd.ends_with("-e image_file /data/local/tmp/cliplink_image.txt"));
    }

    #[test]
    fn listing_prefers_image() {
        let c = commands();
        let both = format!(
            "{}\n{}\n",
            c.artifact_path(RemoteArtifactKind::Image),
            c.artifact_path(RemoteArtifactKind::Text)
        );
        assert_eq!(c.parse_listing(&both), Some(RemoteArtifactKind::Image));

        let text_only = format!("{}\n", c.artifact_path(RemoteArtifactKind::Text));
        assert_eq!(c.parse_listing(&text_only), Some(RemoteArtifactKind::Text));

        assert_eq!(c.parse_listing(""), None);
    }

    #[test]
    fn trailing_slash_in_files_dir_is_ignored() {
        let config = CompanionConfig {
            files_dir: "/sdcard/x/".into(),
            ..CompanionConfig::default()
        };
        let c = CompanionCommands::new(&config);
        assert_eq!(
            c.artifact_path(RemoteArtifactKind::Text),
            "/sdcard/x/clipboard_content.txt"
        );
    }
}
