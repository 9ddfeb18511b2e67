#![allow(dead_code)]

use std::sync::Once;

use gist_core::{Gist, GistFile, Owner};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(gist_logging::initialize_for_tests);
}

pub fn file(name: &str, content: Option<&str>) -> GistFile {
    GistFile {
        filename: name.to_string(),
        mime_type: Some("text/plain".to_string()),
        language: None,
        raw_url: Some(format!("https://gist.example.com/raw/{name}")),
        size: content.map_or(0, |c| c.len() as u64),
        content: content.map(ToOwned::to_owned),
    }
}

pub fn gist(id: &str, description: &str, owner: &str, files: Vec<GistFile>) -> Gist {
    Gist {
        id: id.to_string(),
        description: Some(description.to_string()),
        public: true,
        html_url: Some(format!("https://gist.example.com/{id}")),
        owner: Some(Owner {
            login: owner.to_string(),
            avatar_url: format!("https://avatars.example.com/{owner}"),
        }),
        updated_at: Some("2024-05-01T10:00:00Z".to_string()),
        files: files
            .into_iter()
            .map(|f| (f.filename.clone(), f))
            .collect(),
    }
}

pub fn simple(id: &str) -> Gist {
    gist(id, &format!("gist {id}"), "octocat", vec![file("a.txt", None)])
}
