//! Fixed user-facing texts and button labels.

use rusgo_core::Language;

/// Instruction that opens every session.
pub const SYSTEM_PROMPT: &str = "Ты Telegram-бот RUSGO. Помогаешь людям, оказавшимся в России, \
решать повседневные и юридические вопросы — как устроиться, где оформить документы, как продлить \
регистрацию, оформить патент, сделать медсправку, найти жильё и т.д. Если пользователь пишет \
‘патент’, по умолчанию считай, что речь идёт о разрешении на работу. Отвечай просто, \
по-человечески, как опытный человек, который знает реальные схемы. Не морализируй.";

pub const GREETING: &str = "👋 Привет! Я — RUSGO. Помогаю разобраться в повседневных вопросах \
по жизни в России.\n\nВыбери язык, на котором тебе удобно общаться:";

pub const LANGUAGE_SAVED: &str =
    "✅ Язык сохранён. Теперь можешь выбрать нужную тему или задать свой вопрос:";

pub const FIND_NEARBY_BUTTON: &str = "🔍 Найти рядом";

pub const FIND_HINT: &str = "✍️ Напиши, что именно хочешь найти и в каком городе.\n\n\
Например:\n/найти медосмотр Москва";

pub const SEARCH_USAGE: &str = "❗ Укажи, что искать. Пример: /найти медосмотр Москва";

pub const SEARCH_HEADER: &str = "🔍 Нашёл вот что:\n\n";
pub const SEARCH_EMPTY: &str = "😔 Ничего не нашёл. Попробуй уточнить запрос.";
pub const SEARCH_FAILED: &str = "⚠️ Ошибка при поиске. Попробуй позже.";

pub const FOOD_HEADER: &str = "☕ Вот несколько кафе рядом:\n\n";
pub const FOOD_EMPTY: &str = "😔 Не нашёл кафе поблизости. Попробуй уточнить запрос.";

pub const REPLY_FAILED: &str = "⚠️ Произошла ошибка при ответе. Попробуй позже.";

/// Topic buttons shown after a language is picked, row by row.
pub const TOPIC_ROWS: &[&[&str]] = &[
    &["📄 Хочу сделать регистрацию — как?", "📑 Как оформить патент на работу?"],
    &["🏠 Где найти жильё или прописку?", "🚑 Где пройти медосмотр быстро?"],
    &["📱 Где купить симку без проблем?", "💳 Как открыть карту в банке?"],
    &[FIND_NEARBY_BUTTON],
    &["✍️ Задать свой вопрос"],
];

/// Returns the button label of a language.
#[must_use]
pub const fn language_label(language: Language) -> &'static str {
    match language {
        Language::Russian => "🇷🇺 Русский",
        Language::Uzbek => "🇺🇿 O'zbekcha",
        Language::Tajik => "🇹🇯 Тоҷикӣ",
    }
}

/// Maps a button label back to its language.
#[must_use]
pub fn language_for_label(label: &str) -> Option<Language> {
    Language::ALL
        .into_iter()
        .find(|&language| language_label(language) == label)
}
