//! Opening (and decrypting) statement PDFs.

use log::{debug, warn};
use lopdf::encryption::DecryptionError;
use lopdf::{Document, Error as PdfError};
use paybill_core::{Result, StatementError};

/// Load a PDF from memory, decrypting it when it is password protected.
///
/// Documents protected only by an owner password open without one. When a
/// user password is required, `password` must match it; anything the
/// security handler cannot process is reported as a `Pdf` error instead.
pub fn open_document(bytes: &[u8], password: Option<&str>) -> Result<Document> {
    let doc = Document::load_mem(bytes).map_err(load_error)?;
    if !is_locked(&doc) {
        return Ok(doc);
    }

    let supplied = password.filter(|p| !p.is_empty());
    debug!("document needs a user password, supplied: {}", supplied.is_some());

    let Some(password) = supplied else {
        return Err(match doc.authenticate_password("") {
            Err(e) if !is_wrong_password(&e) => unsupported(e),
            _ => StatementError::Authentication("the document is password protected".into()),
        });
    };

    if let Err(e) = doc.authenticate_password(password) {
        return Err(if is_wrong_password(&e) {
            StatementError::Authentication("incorrect password".into())
        } else {
            unsupported(e)
        });
    }

    let doc = Document::load_mem_with_password(bytes, password).map_err(load_error)?;
    if is_locked(&doc) {
        warn!("password accepted but the document stayed encrypted");
        return Err(StatementError::Pdf("could not decrypt the document".into()));
    }
    Ok(doc)
}

/// lopdf decrypts on load and drops `/Encrypt` from the trailer. It is left
/// in place (with no objects loaded) when the user password was not known.
fn is_locked(doc: &Document) -> bool {
    doc.trailer.get(b"Encrypt").is_ok()
}

fn is_wrong_password(err: &PdfError) -> bool {
    matches!(
        err,
        PdfError::InvalidPassword | PdfError::Decryption(DecryptionError::IncorrectPassword)
    )
}

fn unsupported(err: PdfError) -> StatementError {
    StatementError::Pdf(format!("unsupported encryption: {err}"))
}

fn load_error(err: PdfError) -> StatementError {
    if is_wrong_password(&err) {
        StatementError::Authentication("incorrect password".into())
    } else {
        StatementError::Pdf(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_is_not_a_pdf() {
        match open_document(b"definitely not a pdf", None) {
            Err(StatementError::Pdf(_)) => {}
            other => panic!("expected Pdf error, got {other:?}"),
        }
    }

    #[test]
    fn test_only_password_mismatch_is_an_auth_failure() {
        assert!(is_wrong_password(&PdfError::InvalidPassword));
        assert!(is_wrong_password(&PdfError::Decryption(
            DecryptionError::IncorrectPassword
        )));
        assert!(!is_wrong_password(&PdfError::Decryption(
            DecryptionError::UnsupportedEncryption
        )));
        assert!(!is_wrong_password(&PdfError::Decryption(
            DecryptionError::MissingFileID
        )));

        assert!(matches!(
            load_error(PdfError::InvalidPassword),
            StatementError::Authentication(_)
        ));
        match unsupported(PdfError::Decryption(DecryptionError::UnsupportedEncryption)) {
            StatementError::Pdf(msg) => assert!(msg.starts_with("unsupported encryption")),
            other => panic!("expected Pdf error, got {other:?}"),
        }
    }
}
