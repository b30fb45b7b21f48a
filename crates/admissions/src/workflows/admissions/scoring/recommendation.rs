use super::PredictiveScore;

const DEFAULT_STREAM: &str = "Général";

/// Suggest a study stream from a score, falling back to the track when the
/// academic band is weak.
pub fn recommend_stream(score: Option<&PredictiveScore>, track: Option<&str>) -> String {
    let Some(score) = score else {
        return DEFAULT_STREAM.to_string();
    };

    let breakdown = &score.breakdown;
    let stream = if breakdown.academic >= 70 {
        if breakdown.track >= 12 {
            "Informatique"
        } else {
            "Gestion"
        }
    } else if breakdown.academic >= 40 {
        if breakdown.track >= 12 {
            "Engineering"
        } else {
            "Management"
        }
    } else {
        track.map(stream_for_track).unwrap_or(DEFAULT_STREAM)
    };

    stream.to_string()
}

fn stream_for_track(track: &str) -> &'static str {
    let track = track.to_lowercase();
    if track.contains('s') || track.contains("scientifique") {
        "Informatique"
    } else if track.contains("es") || track.contains("economique") {
        "Gestion"
    } else if track.contains('l') || track.contains("litteraire") {
        "Management"
    } else {
        DEFAULT_STREAM
    }
}
