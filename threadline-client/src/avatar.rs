const COLORS: [&str; 8] = [
    "bg-red-500",
    "bg-blue-500",
    "bg-green-500",
    "bg-yellow-500",
    "bg-purple-500",
    "bg-pink-500",
    "bg-indigo-500",
    "bg-teal-500",
];

/// Letter badge shown next to an author's name
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Avatar {
    pub letter: String,
    pub color_class: &'static str,
}

impl Avatar {
    /// Color is picked from the first UTF-16 code unit of the name, so that a
    /// given name always gets the same color
    pub fn for_name(name: &str) -> Avatar {
        match name.chars().next() {
            None => Avatar {
                letter: String::from("?"),
                color_class: COLORS[0],
            },
            Some(first) => {
                let mut buf = [0; 2];
                let unit = first.encode_utf16(&mut buf)[0];
                Avatar {
                    letter: first.to_uppercase().collect(),
                    color_class: COLORS[unit as usize % COLORS.len()],
                }
            }
        }
    }
}
