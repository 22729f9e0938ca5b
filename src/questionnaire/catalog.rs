/// Symptom questions, in the order they are asked
pub const QUESTIONS: [&str; 6] = [
    "Have you noticed any blurriness or difficulty focusing on objects — even when your glasses or lenses are clean?",
    "Do you ever see small floating spots, dark strings, or flashes of light in your vision?",
    "Have you noticed any dark spots or floaters in your vision?",
    "Do you have difficulty seeing at night or in low light?",
    "Do your blood sugar readings tend to vary a lot from day to day?",
    "Do you sometimes skip meals or go long periods without eating, then eat a heavy or high-sugar meal afterward?",
];
