pub mod glossary_service;
pub mod validation;

pub use glossary_service::{
    CreateEntryInput, CreateGlossaryInput, GlossaryService, UpdateEntryInput, UploadImageInput,
    UploadPolicy, UploadedImage,
};
