// Built-in annotation prompts.
// Each entry is (key, instruction, valid response shape).

pub enum BuiltinResponse {
    OneOf(&'static [&'static str]),
    Words(usize),
}

const HIGH_NEUTRAL_LOW: &[&str] = &["high", "neutral", "low"];

pub const BUILTIN_PROMPTS: &[(&str, &str, BuiltinResponse)] = &[
    (
        "emotion",
        "Return only the word \"high\", \"neutral\", or \"low\" depending on the degree to which \
         the author of the report exhibits emotion. Respond with only one word.",
        BuiltinResponse::OneOf(HIGH_NEUTRAL_LOW),
    ),
    (
        "passivity",
        "Return only the word \"active\", \"passive\", or \"neutral\" depending on what best \
         characterizes the grammar and style of the report. Respond with only one word.",
        BuiltinResponse::OneOf(&["active", "passive", "neutral"]),
    ),
    (
        "panic/shame",
        "Return only the word \"high\", \"neutral\", or \"low\" depending on the degree to which \
         the author of the report is exhibiting panic or expressing guilt or shame.",
        BuiltinResponse::OneOf(HIGH_NEUTRAL_LOW),
    ),
    (
        "apologetic",
        "Return only the word \"high\", \"neutral\", or \"low\" depending on the degree to which \
         the author of the following report could be described as defensive and seeking to \
         justify their own actions.",
        BuiltinResponse::OneOf(HIGH_NEUTRAL_LOW),
    ),
    (
        "self-aware",
        "Return only the word \"high\", \"neutral\", or \"low\" depending on the degree to which \
         the author of the following report is aware of and attempting to manage their public \
         image.",
        BuiltinResponse::OneOf(HIGH_NEUTRAL_LOW),
    ),
    (
        "aware-of-other-reports",
        "Return only the word \"high\", \"neutral\", or \"low\" depending on the degree to which \
         the author of the following report is aware of other reports being shared or made \
         public (e.g., in newspapers).",
        BuiltinResponse::OneOf(HIGH_NEUTRAL_LOW),
    ),
    (
        "boring",
        "Return only the word \"vivid\", \"neutral\", or \"boring\" depending on the degree to \
         which the author of the following report depicts events in a lively and engaging \
         manner compared to a dull report. Respond with only one word",
        BuiltinResponse::OneOf(&["vivid", "neutral", "boring"]),
    ),
    (
        "in-a-word",
        "Return only one word that best describes the overall tone or manner of the following \
         report. Respond with only one word",
        BuiltinResponse::Words(1),
    ),
];
