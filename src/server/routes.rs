//! Route handlers.
//!
//! Every handler resolves the caller's session from the `fable_session`
//! cookie first, then works on that session only. Submitting a story and
//! requesting an image create a session (and set the cookie) on first
//! contact; viewing and choosing only create one in demo mode.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use log::{debug, info};
use serde::Deserialize;

use crate::core::{Session, SessionHandle, Story, StoryError};
use crate::images::{FetchedImage, ImageError};
use crate::server::error::ApiError;
use crate::server::view::ChapterView;
use crate::server::AppState;

pub const SESSION_COOKIE: &str = "fable_session";

/// An error that still carries the cookie jar, so a session created during
/// the request reaches the client even when the request fails.
type Rejection = (CookieJar, ApiError);

fn session_cookie(id: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn session_id(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|c| c.value().to_string())
}

/// Finds the caller's session, creating it (and its cookie) on first contact.
async fn open_session(state: &AppState, jar: CookieJar) -> (CookieJar, SessionHandle) {
    let existing = session_id(&jar);
    let (id, handle, created) = state.sessions.open(existing.as_deref()).await;
    let jar = if created {
        jar.add(session_cookie(id))
    } else {
        jar
    };
    (jar, handle)
}

/// Finds the session a view or choice request works on.
///
/// Outside demo mode nothing is created: a caller without a known session
/// gets `NoActiveSession` and leaves no entry behind in the registry.
async fn view_session(
    state: &AppState,
    jar: CookieJar,
) -> Result<(CookieJar, SessionHandle), Rejection> {
    let existing = match session_id(&jar) {
        Some(id) => state.sessions.get(&id).await,
        None => None,
    };
    match existing {
        Some(handle) => Ok((jar, handle)),
        None if state.demo_story => Ok(open_session(state, jar).await),
        None => Err((jar, StoryError::NoActiveSession.into())),
    }
}

/// In demo mode a session without a story gets the sailing story.
fn seed_demo(state: &AppState, session: &mut Session) {
    if state.demo_story && !session.has_story() {
        info!("Seeding session with the demo story");
        session.start(Story::sailing_demo());
    }
}

/// `POST /submit`: body is a JSON array of chapter records.
pub async fn submit(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Bytes,
) -> Result<(StatusCode, CookieJar), ApiError> {
    info!("Story submitted ({} bytes)", body.len());
    debug!("Story body: {}", String::from_utf8_lossy(&body));

    let story = Story::from_json(&body)?;
    let (jar, handle) = open_session(&state, jar).await;
    let mut session = handle.lock().await;
    let chapters = session.start(story).story().len();

    info!("Story started: {} chapters", chapters);
    Ok((StatusCode::NO_CONTENT, jar))
}

#[derive(Deserialize, Debug)]
pub struct ChoiceQuery {
    pub choice: String,
}

/// `GET /new_chapter_from_choice?choice=<label>`
pub async fn choose(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<ChoiceQuery>,
) -> Result<(CookieJar, Json<ChapterView>), Rejection> {
    info!("Choice: '{}'", query.choice);

    let (jar, handle) = view_session(&state, jar).await?;
    let mut session = handle.lock().await;
    seed_demo(&state, &mut session);

    let advanced = session.story_mut().and_then(|story| {
        story.advance(&query.choice)?;
        Ok(ChapterView::of(story))
    });
    match advanced {
        Ok(view) => Ok((jar, Json(view))),
        Err(e) => Err((jar, e.into())),
    }
}

/// `GET /story_image_data`: the current chapter view.
pub async fn current_chapter(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ChapterView>), Rejection> {
    let (jar, handle) = view_session(&state, jar).await?;
    let mut session = handle.lock().await;
    seed_demo(&state, &mut session);

    match session.story() {
        Ok(story) => {
            debug!(
                "Viewing chapter {} of {}",
                story.current_index(),
                story.story().len()
            );
            Ok((jar, Json(ChapterView::of(story))))
        }
        Err(e) => Err((jar, e.into())),
    }
}

#[derive(Deserialize, Debug)]
pub struct ImageQuery {
    pub text: String,
}

/// `GET /make_image_from_text?text=<prompt>`: resolves the prompt through
/// the session's cache and proxies the image bytes.
///
/// The session lock is held while the provider runs, so a player reloading
/// the page never triggers two generations for the same prompt.
pub async fn image(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<ImageQuery>,
) -> Result<(CookieJar, [(header::HeaderName, String); 1], Vec<u8>), Rejection> {
    info!("Image requested for prompt ({} bytes)", query.text.len());

    let (jar, handle) = open_session(&state, jar).await;
    match resolve_image(&state, &handle, &query.text).await {
        Ok(image) => Ok((jar, [(header::CONTENT_TYPE, image.content_type)], image.bytes)),
        Err(e) => Err((jar, e.into())),
    }
}

async fn resolve_image(
    state: &AppState,
    handle: &SessionHandle,
    prompt: &str,
) -> Result<FetchedImage, ImageError> {
    let resolution = {
        let mut session = handle.lock().await;
        session
            .images
            .resolve(state.images.as_ref(), prompt)
            .await?
    };

    let image = state.fetcher.fetch(&resolution.url).await?;
    if resolution.generated {
        state.fetcher.archive(&image).await;
    }
    Ok(image)
}

/// `DELETE /session`: discards the caller's story and image cache.
pub async fn end_session(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(StatusCode, CookieJar), ApiError> {
    let id = session_id(&jar).ok_or(StoryError::NoActiveSession)?;

    if !state.sessions.end(&id).await {
        return Err(StoryError::NoActiveSession.into());
    }
    Ok((
        StatusCode::NO_CONTENT,
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
    ))
}

pub async fn health() -> &'static str {
    "ok"
}
