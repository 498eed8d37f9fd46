use std::sync::RwLock;

use uuid::Uuid;

use crate::constants::CTX_LOCK_ERR;
use crate::core::domain::{Language, Problem};
use crate::core::events::EventBus;

/// The host page's editor buffer. The orchestrator reads it but never owns
/// it; the host (or a test) writes it through the context.
#[derive(Clone, Debug)]
pub struct EditorBuffer {
    pub code: String,
    pub language: Language,
}

impl Default for EditorBuffer {
    fn default() -> Self {
        Self {
            code: String::new(),
            language: Language::Python,
        }
    }
}

/// Explicit orchestration context shared by all workbench components.
/// Constructed at workbench mount and dropped at unmount; nothing here is
/// process-global.
#[derive(Debug)]
pub struct WorkbenchContext {
    bus: EventBus,
    problem: RwLock<Option<Problem>>,
    editor: RwLock<EditorBuffer>,
}

impl Default for WorkbenchContext {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkbenchContext {
    pub fn new() -> Self {
        Self {
            bus: EventBus::new(),
            problem: RwLock::new(None),
            editor: RwLock::new(EditorBuffer::default()),
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn set_problem(&self, problem: Problem) {
        *self.problem.write().expect(CTX_LOCK_ERR) = Some(problem);
    }

    pub fn problem(&self) -> Option<Problem> {
        self.problem.read().expect(CTX_LOCK_ERR).clone()
    }

    pub fn problem_id(&self) -> Option<Uuid> {
        self.problem.read().expect(CTX_LOCK_ERR).as_ref().map(|p| p.id)
    }

    pub fn code(&self) -> String {
        self.editor.read().expect(CTX_LOCK_ERR).code.clone()
    }

    pub fn set_code(&self, code: &str) {
        self.editor.write().expect(CTX_LOCK_ERR).code = code.to_string();
    }

    pub fn language(&self) -> Language {
        self.editor.read().expect(CTX_LOCK_ERR).language
    }

    pub fn set_language(&self, language: Language) {
        self.editor.write().expect(CTX_LOCK_ERR).language = language;
    }
}
