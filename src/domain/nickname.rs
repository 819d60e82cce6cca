/// Which way round a fixture must be reported so the searched player comes first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    AsIs,
    Swapped,
}

/// Case-insensitive substring match against either side.
/// A first-side match keeps the order, even when both sides match.
pub fn orient(nickname: &str, first_name: &str, second_name: &str) -> Option<Orientation> {
    let needle = nickname.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    if first_name.to_lowercase().contains(&needle) {
        Some(Orientation::AsIs)
    } else if second_name.to_lowercase().contains(&needle) {
        Some(Orientation::Swapped)
    } else {
        None
    }
}
