use futures_util::future::join_all;
use gist_core::Gist;
use gist_logging::{gist_debug, gist_warn};

use crate::GistApi;

/// Fills in the first file's content of every gist by re-requesting each gist.
///
/// All lookups run concurrently and the call returns once every one has
/// settled. A failed lookup leaves that gist without a preview.
pub async fn resolve_first_files(api: &dyn GistApi, gists: Vec<Gist>) -> Vec<Gist> {
    let lookups = gists.iter().map(|gist| async move {
        gist.first_file()?;
        match api.get(&gist.id).await {
            Ok(full) => full.first_file().and_then(|file| file.content.clone()),
            Err(err) => {
                gist_warn!("preview for gist {} unavailable: {err}", gist.id);
                None
            }
        }
    });
    let contents = join_all(lookups).await;
    gist_debug!("resolved previews for {} gists", contents.len());

    gists
        .into_iter()
        .zip(contents)
        .map(|(mut gist, content)| {
            if let (Some(file), Some(content)) = (gist.first_file_mut(), content) {
                file.content = Some(content);
            }
            gist
        })
        .collect()
}

/// Downloads the raw content of every file of `gist` concurrently.
///
/// Files whose download fails keep whatever content they already had.
pub async fn resolve_all_files(api: &dyn GistApi, mut gist: Gist) -> Gist {
    let downloads = gist.files.iter().map(|(name, file)| async move {
        let raw_url = file.raw_url.as_deref()?;
        match api.raw_content(raw_url).await {
            Ok(content) => Some((name.clone(), content)),
            Err(err) => {
                gist_warn!("content of {name} unavailable: {err}");
                None
            }
        }
    });
    let fetched: Vec<_> = join_all(downloads).await.into_iter().flatten().collect();

    for (name, content) in fetched {
        if let Some(file) = gist.files.get_mut(&name) {
            file.content = Some(content);
        }
    }
    gist
}
