use crate::model::{ExtensionEntry, ExtensionKind};
use crate::transliterate::Transliterator;

/// Features shipped with the launcher, addressed by their `invocation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinFeature {
    Files,
    KillProcess,
    Scanner,
}

impl BuiltinFeature {
    pub const ALL: [BuiltinFeature; 3] = [
        BuiltinFeature::Files,
        BuiltinFeature::KillProcess,
        BuiltinFeature::Scanner,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            BuiltinFeature::Files => "files",
            BuiltinFeature::KillProcess => "kill-process",
            BuiltinFeature::Scanner => "scanner",
        }
    }

    pub fn from_invocation(invocation: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.id() == invocation)
    }

    fn entry(&self) -> ExtensionEntry {
        let (name, description, keywords): (&str, &str, &[&str]) = match self {
            BuiltinFeature::Files => ("Files", "Browse local storage", &["file", "browser", "文件"]),
            BuiltinFeature::KillProcess => {
                ("Kill Process", "Terminate a running process", &["kill", "stop", "结束进程"])
            }
            BuiltinFeature::Scanner => ("Scanner", "Scan a QR code or barcode", &["qr", "barcode", "扫码"]),
        };
        ExtensionEntry::new(self.id(), name, description, ExtensionKind::Internal, self.id())
            .with_keywords(keywords)
    }
}

pub fn builtin_extensions(transliterator: &Transliterator) -> Vec<ExtensionEntry> {
    BuiltinFeature::ALL
        .iter()
        .map(|feature| {
            let mut entry = feature.entry();
            entry.refresh_derived(transliterator);
            entry
        })
        .collect()
}
