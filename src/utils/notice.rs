/// 使用者可見的提示：同時寫入日誌與 stdout/stderr，並保留在步驟報告裡
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notices {
    messages: Vec<String>,
}

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: String) {
        tracing::info!("{}", message);
        println!("{}", message);
        self.messages.push(message);
    }

    pub fn warn(&mut self, message: String) {
        tracing::warn!("{}", message);
        eprintln!("{}", message);
        self.messages.push(message);
    }

    pub fn extend(&mut self, other: Notices) {
        self.messages.extend(other.messages);
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn into_vec(self) -> Vec<String> {
        self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notices_keep_order() {
        let mut notices = Notices::new();
        notices.warn("🚫 File not found: zips/a.zip".to_string());
        notices.info("✅ Extracted: zips/b.zip".to_string());

        let mut more = Notices::new();
        more.info("done".to_string());
        notices.extend(more);

        assert_eq!(
            notices.into_vec(),
            vec!["🚫 File not found: zips/a.zip", "✅ Extracted: zips/b.zip", "done"]
        );
    }
}
