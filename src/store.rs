use crate::db::{Gateway, StorageError};
use crate::messages::Message;
use crate::model::{self, StudentInput, StudentRecord};
use crate::validation::{self, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("form is not open")]
    FormClosed,
    #[error("form is already open")]
    FormAlreadyOpen,
    #[error("no delete pending for student {id}")]
    NoPendingDelete { id: i64 },
    #[error("failed to open workspace: {0:#}")]
    WorkspaceOpen(anyhow::Error),
}

impl StoreError {
    /// Stable code reported over IPC.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Validation(ValidationError::MissingField { .. }) => "missing_field",
            StoreError::Validation(ValidationError::NotANumber { .. }) => "not_a_number",
            StoreError::Validation(ValidationError::OutOfRange { .. }) => "out_of_range",
            StoreError::Validation(ValidationError::UnknownCourse(_)) => "unknown_course",
            StoreError::Storage(StorageError::Init(_)) => "storage_init_failed",
            StoreError::Storage(StorageError::Read(_)) => "storage_read_failed",
            StoreError::Storage(StorageError::Write(_)) => "storage_write_failed",
            StoreError::Storage(StorageError::NotFound { .. }) => "not_found",
            StoreError::FormClosed => "form_closed",
            StoreError::FormAlreadyOpen => "form_already_open",
            StoreError::NoPendingDelete { .. } => "no_pending_delete",
            StoreError::WorkspaceOpen(_) => "storage_init_failed",
        }
    }

    pub fn message(&self) -> Message {
        match self {
            StoreError::Validation(ValidationError::MissingField { .. }) => Message::MissingField,
            StoreError::Validation(ValidationError::NotANumber { .. }) => Message::NotANumber,
            StoreError::Validation(ValidationError::OutOfRange { .. }) => Message::OutOfRange,
            StoreError::Validation(ValidationError::UnknownCourse(_)) => Message::UnknownCourse,
            StoreError::Storage(StorageError::Init(_)) => Message::InitFailed,
            StoreError::Storage(StorageError::Read(_)) => Message::LoadFailed,
            StoreError::Storage(StorageError::Write(_)) => Message::SaveFailed,
            StoreError::Storage(StorageError::NotFound { .. }) => Message::NotFound,
            StoreError::FormClosed => Message::FormClosed,
            StoreError::FormAlreadyOpen => Message::FormAlreadyOpen,
            StoreError::NoPendingDelete { .. } => Message::NoPendingDelete,
            StoreError::WorkspaceOpen(_) => Message::InitFailed,
        }
    }
}

/// Raw text of the add/edit form, exactly as typed.
#[derive(Debug, Clone, PartialEq)]
pub struct FormFields {
    pub name: String,
    pub student_id: String,
    pub course_name: String,
    pub score_component1: String,
    pub score_component2: String,
    pub score_final_exam: String,
}

impl Default for FormFields {
    fn default() -> Self {
        Self {
            name: String::new(),
            student_id: String::new(),
            course_name: model::default_course().to_string(),
            score_component1: String::new(),
            score_component2: String::new(),
            score_final_exam: String::new(),
        }
    }
}

impl FormFields {
    fn from_record(r: &StudentRecord) -> Self {
        Self {
            name: r.name.clone(),
            student_id: r.student_id.clone(),
            course_name: r.course_name.clone(),
            score_component1: r.scores.component1.to_string(),
            score_component2: r.scores.component2.to_string(),
            score_final_exam: r.scores.final_exam.to_string(),
        }
    }

    fn to_input(&self) -> Result<StudentInput, ValidationError> {
        let scores = validation::validate(
            &self.name,
            &self.student_id,
            &self.score_component1,
            &self.score_component2,
            &self.score_final_exam,
        )?;
        validation::validate_course(&self.course_name)?;
        Ok(StudentInput {
            name: self.name.trim().to_string(),
            student_id: self.student_id.trim().to_string(),
            course_name: self.course_name.clone(),
            scores,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Closed,
    Adding,
    Editing { id: i64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    pub mode: FormMode,
    pub fields: FormFields,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created { id: i64 },
    Updated { id: i64 },
}

/// The record list and form state the front end renders. The list is only
/// ever replaced by a fresh `select_all`, never patched.
pub struct RecordStore {
    gateway: Gateway,
    records: Vec<StudentRecord>,
    form: Form,
    pending_delete: Option<i64>,
}

impl RecordStore {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            records: Vec::new(),
            form: Form {
                mode: FormMode::Closed,
                fields: FormFields::default(),
            },
            pending_delete: None,
        }
    }

    /// Ensures the schema and loads the list. On failure the list is left
    /// empty; calling again retries.
    pub fn initialize(&mut self) -> Result<(), StoreError> {
        let loaded = self
            .gateway
            .ensure_schema()
            .and_then(|_| self.gateway.select_all());
        match loaded {
            Ok(rows) => {
                tracing::info!(count = rows.len(), "student records loaded");
                self.records = rows;
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to initialize record store");
                self.records.clear();
                Err(StoreError::Storage(match e {
                    StorageError::Read(inner) => StorageError::Init(inner),
                    other => other,
                }))
            }
        }
    }

    pub fn reload(&mut self) -> Result<(), StoreError> {
        match self.gateway.select_all() {
            Ok(rows) => {
                self.records = rows;
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to reload student records");
                Err(e.into())
            }
        }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn pending_delete(&self) -> Option<i64> {
        self.pending_delete
    }

    pub fn open_add(&mut self) -> Result<(), StoreError> {
        self.ensure_closed()?;
        self.form = Form {
            mode: FormMode::Adding,
            fields: FormFields::default(),
        };
        Ok(())
    }

    pub fn open_edit(&mut self, id: i64) -> Result<(), StoreError> {
        self.ensure_closed()?;
        let Some(record) = self.records.iter().find(|r| r.id == id) else {
            return Err(StorageError::NotFound { id }.into());
        };
        self.form = Form {
            mode: FormMode::Editing { id },
            fields: FormFields::from_record(record),
        };
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.close_form();
    }

    /// Validates and writes the form. Validation or write failures leave the
    /// form open with `fields` retained and the list untouched.
    pub fn save(&mut self, fields: FormFields) -> Result<SaveOutcome, StoreError> {
        let editing = match self.form.mode {
            FormMode::Closed => return Err(StoreError::FormClosed),
            FormMode::Adding => None,
            FormMode::Editing { id } => Some(id),
        };
        self.form.fields = fields;

        let input = match self.form.fields.to_input() {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "form rejected");
                return Err(e.into());
            }
        };

        let outcome = match editing {
            None => self
                .gateway
                .insert(&input)
                .map(|id| SaveOutcome::Created { id }),
            Some(id) => self
                .gateway
                .update(id, &input)
                .map(|_| SaveOutcome::Updated { id }),
        };
        let outcome = match outcome {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "failed to save student record");
                return Err(e.into());
            }
        };
        tracing::info!(?outcome, grade = %input.scores.grade(), "student record saved");

        // The row is committed; the form closes even if the refresh fails.
        self.close_form();
        self.reload()?;
        Ok(outcome)
    }

    /// First half of a delete: remembers the target until confirmed.
    pub fn request_delete(&mut self, id: i64) -> Result<(), StoreError> {
        if !self.records.iter().any(|r| r.id == id) {
            return Err(StorageError::NotFound { id }.into());
        }
        self.pending_delete = Some(id);
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn confirm_delete(&mut self, id: i64) -> Result<(), StoreError> {
        if self.pending_delete != Some(id) {
            return Err(StoreError::NoPendingDelete { id });
        }
        self.pending_delete = None;
        if let Err(e) = self.gateway.delete(id) {
            tracing::error!(id, error = %e, "failed to delete student record");
            return Err(e.into());
        }
        tracing::info!(id, "student record deleted");
        if self.form.mode == (FormMode::Editing { id }) {
            self.close_form();
        }
        self.reload()
    }

    fn ensure_closed(&self) -> Result<(), StoreError> {
        if self.form.mode != FormMode::Closed {
            return Err(StoreError::FormAlreadyOpen);
        }
        Ok(())
    }

    fn close_form(&mut self) {
        self.form = Form {
            mode: FormMode::Closed,
            fields: FormFields::default(),
        };
    }
}
