//! Example client for the Filedock Server API

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::{json, Value};

const SERVER_URL: &str = "http://localhost:8000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = Client::new();

    // Example 1: Health check
    println!("1. Health Check:");
    let resp = client.get(format!("{SERVER_URL}/health")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 2: Upload a spec and a CSV in one form
    println!("2. Upload:");
    let form = Form::new()
        .part(
            "spec",
            Part::bytes(b"# Quarterly report\n".to_vec()).file_name("report spec.md"),
        )
        .part(
            "csv",
            Part::bytes(b"region;units;revenue\nnorth;12;340\nsouth;7;198\n".to_vec())
                .file_name("sales.csv"),
        );
    let resp = client
        .post(format!("{SERVER_URL}/api/upload"))
        .multipart(form)
        .send()
        .await?;
    println!("Status: {}", resp.status());
    let body: Value = resp.json().await?;
    println!("Body: {}", serde_json::to_string_pretty(&body)?);
    println!();

    let stored_csv = body["files"]["csv"]["stored_as"]
        .as_str()
        .unwrap_or("csv__sales.csv")
        .to_string();

    // Example 3: Fetch the stored file back
    println!("3. Retrieve {stored_csv}:");
    let resp = client
        .get(format!("{SERVER_URL}/files/{stored_csv}"))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 4: Preview with delimiter detection
    println!("4. Preview (detected delimiter):");
    let resp = client
        .post(format!("{SERVER_URL}/api/preview"))
        .json(&json!({ "filename": stored_csv, "maxLines": 1 }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 5: Preview with an explicit delimiter
    println!("5. Preview (explicit delimiter):");
    let resp = client
        .post(format!("{SERVER_URL}/api/preview"))
        .json(&json!({ "filename": stored_csv, "delimiter": ";" }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 6: Preview a file that does not exist
    println!("6. Preview (missing file):");
    let resp = client
        .post(format!("{SERVER_URL}/api/preview"))
        .json(&json!({ "filename": "csv__nope.csv" }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);

    Ok(())
}
