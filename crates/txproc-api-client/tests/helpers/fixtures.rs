use std::path::PathBuf;

use serde_json::json;
use tempfile::TempDir;

pub const CSV_CONTENTS: &str = "date,amount\n2022-05-01,12.50\n2022-05-02,7.25\n";
pub const SIGNATURE: &str = "abc123";

/// Write `data.csv` into a fresh temp dir. Keep the dir alive for the test.
pub fn csv_file() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.csv");
    std::fs::write(&path, CSV_CONTENTS).unwrap();
    (dir, path)
}

/// Path component of the pre-signed URL handed out for `attachment_id`.
pub fn upload_path(attachment_id: &str) -> String {
    format!("/uploads/{}/data.csv", attachment_id)
}

pub fn grant_body(server_url: &str, attachment_id: &str) -> String {
    json!({
        "data": {
            "id": attachment_id,
            "entity": "tx-processor",
            "entity_id": "ent-9",
            "filename": "data.csv",
            "pre_signed_url": format!(
                "{}{}?X-Amz-Signature={}",
                server_url,
                upload_path(attachment_id),
                SIGNATURE
            ),
            "headers": {
                "x-amz-meta-content-type": "text/csv",
                "x-amz-meta-entity": "tx-processor",
                "x-amz-meta-entity-id": "ent-9",
                "x-amz-meta-filename": "2022/05/data.csv",
                "x-amz-meta-public": "false",
                "x-amz-meta-uploader": "user-3"
            }
        }
    })
    .to_string()
}

pub fn job_body(job_id: &str, attachment_id: &str) -> String {
    json!({
        "data": {
            "id": job_id,
            "created_at": "2022-05-01T10:00:00Z",
            "updated_at": "2022-05-01T10:00:00Z",
            "created_by": "user-3",
            "updated_by": "user-3",
            "attachment_id": attachment_id,
            "status": "created",
            "ended_at": null,
            "operation": "tx-import"
        }
    })
    .to_string()
}

pub fn worker_body(job_id: &str, status: &str, processed: i64, total: i64) -> String {
    json!({
        "data": {
            "id": job_id,
            "created_at": "2022-05-01T10:00:00Z",
            "updated_at": "2022-05-01T10:00:05Z",
            "deleted_at": null,
            "attachment_id": "att-1",
            "status": status,
            "error_message": "",
            "ended_at": "",
            "operation": "tx-import",
            "proccesed": processed,
            "total": total
        }
    })
    .to_string()
}
