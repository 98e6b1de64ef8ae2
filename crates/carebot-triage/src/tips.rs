//! General wellness tips.

pub const HEALTH_TIPS: &[&str] = &[
    "💧 Stay hydrated - drink 8 glasses of water daily",
    "🏃‍♂️ Get regular exercise - at least 30 minutes daily",
    "😴 Maintain good sleep hygiene - 7-9 hours per night",
    "🥗 Eat a balanced diet with plenty of fruits and vegetables",
    "🧼 Wash your hands regularly to prevent infections",
    "😌 Manage stress through relaxation techniques",
    "🩺 Schedule regular check-ups with your healthcare provider",
];

/// Tips as one newline-separated block.
pub fn health_tips_text() -> String {
    HEALTH_TIPS.join("\n")
}
