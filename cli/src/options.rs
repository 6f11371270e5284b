use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use localpostman_core::{FileAttachment, FormState, HttpMethod};

/// Send one request to an API running on localhost and show the response.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Options {
    /// Target URL. Only http://localhost and https://localhost are accepted.
    pub url: String,

    /// HTTP method
    #[clap(short = 'X', long, default_value = "GET")]
    pub method: HttpMethod,

    /// Bearer token for the Authorization header. `Bearer ` is added if missing.
    #[clap(short, long, default_value = "")]
    pub token: String,

    /// JSON body. Sent as JSON, or as extra form fields when a file is attached.
    #[clap(short, long, default_value = "")]
    pub data: String,

    /// File to upload as the `file` field of a multipart body.
    #[clap(short, long)]
    pub file: Option<PathBuf>,

    /// Keep the token but leave the Authorization header off
    #[clap(long)]
    pub no_auth: bool,

    /// Keep the JSON body but do not send it
    #[clap(long)]
    pub no_body: bool,

    /// Keep the file but do not upload it
    #[clap(long)]
    pub no_file: bool,

    /// Print only the token found in the response
    #[clap(long)]
    pub token_only: bool,

    /// Log request and response details to stderr
    #[clap(short, long)]
    pub verbose: bool,
}

impl Options {
    /// The request form these options describe. Reads the attached file.
    pub fn to_form(&self) -> Result<FormState> {
        let file = self.file.as_deref().map(read_attachment).transpose()?;
        Ok(FormState {
            url: self.url.clone(),
            method: self.method,
            bearer_token: self.token.clone(),
            include_auth: !self.no_auth,
            json_body: self.data.clone(),
            include_body: !self.no_body,
            include_file: !self.no_file,
            file,
        })
    }
}

pub fn parse_options() -> Options {
    Parser::parse()
}

fn read_attachment(path: &Path) -> Result<FileAttachment> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file")
        .to_string();
    Ok(FileAttachment {
        file_name,
        content_type: None,
        bytes,
    })
}
