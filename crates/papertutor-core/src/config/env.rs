use super::Config;

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("PAPERTUTOR_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("PAPERTUTOR_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("PAPERTUTOR_MAX_TOKENS") {
            match v.parse::<u32>() {
                Ok(n) => self.llm.max_tokens = n,
                Err(_) => tracing::warn!("ignoring invalid PAPERTUTOR_MAX_TOKENS value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("PAPERTUTOR_TIMEOUT") {
            match v.parse::<u64>() {
                Ok(secs) => self.llm.timeout_secs = secs,
                Err(_) => tracing::warn!("ignoring invalid PAPERTUTOR_TIMEOUT value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("PAPERTUTOR_MAX_FILE_SIZE") {
            match v.parse::<u64>() {
                Ok(bytes) => self.document.max_file_size = bytes,
                Err(_) => tracing::warn!("ignoring invalid PAPERTUTOR_MAX_FILE_SIZE value: {v}"),
            }
        }
        if let Ok(v) = std::env::var("PAPERTUTOR_LANGUAGE")
            && !v.trim().is_empty()
        {
            self.tutor.language = v;
        }
    }
}
