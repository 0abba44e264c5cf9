use crate::{normalize_hashtags, PostDraft};

/// Prompt asking an external assistant for a deeper review of the draft.
pub fn review_prompt(draft: &PostDraft, post_id: Option<&str>) -> String {
    let hashtags = normalize_hashtags(&draft.hashtags);
    let hashtags = if hashtags.is_empty() {
        "Ninguno".to_string()
    } else {
        hashtags.join(", ")
    };
    let media = draft.media().unwrap_or("[sin media]");

    format!(
        "A continuación se muestra un post de X (Twitter) en modo {mode} (ID {id}). \
Analízalo y sugiere mejoras para aumentar su alcance y engagement.\n\n\
**Texto del post:**\n{text}\n\n\
**Media:** {media}\n\
**Tiene vídeo?** {video}\n\
**Hashtags:** {hashtags}\n\
**Incluye enlaces?** {link}\n\n\
Genera un informe corto (menos de 6 líneas) en español evaluando su desempeño potencial: \
P(reply), dwell time, video_view y riesgo de negatives, con puntos fuertes y una versión optimizada.",
        mode = draft.mode.label(),
        id = post_id.unwrap_or("manual"),
        text = draft.text,
        media = media,
        video = if draft.has_video_hint { "Sí" } else { "No" },
        hashtags = hashtags,
        link = if draft.link_present { "Sí" } else { "No" },
    )
}
