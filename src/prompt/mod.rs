pub mod catalog;

pub use catalog::{Emotion, Voice};

/// Prefix `text` with each tag wrapped as `<tag> `, in selection order.
pub fn apply_emotion_tags<S: AsRef<str>>(text: &str, tags: &[S]) -> String {
    let mut output = String::new();
    for tag in tags {
        output.push('<');
        output.push_str(tag.as_ref());
        output.push_str("> ");
    }
    output.push_str(text);
    output
}

/// Text sent to the Bastion API, where the voice travels inside the prompt.
pub fn format_remote_text<S: AsRef<str>>(voice: Voice, text: &str, tags: &[S]) -> String {
    format!("{}: {}", voice, apply_emotion_tags(text, tags))
}
