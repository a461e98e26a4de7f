//! Fixed keyword lists for the pre-retrieval safety gate.
//!
//! Matching is lower-cased substring containment. There is no negation
//! handling and no word-boundary logic; "I do NOT have chest pain" still
//! matches the red-flag list. That is a known, intentional simplification
//! tuned for recall over precision.

/// Phrases indicating prohibited clinical-action requests: diagnosis,
/// dosing, triage, and medical image interpretation.
pub static BANNED_KEYWORDS: &[&str] = &[
    // Diagnosis
    "diagnose",
    "diagnosis",
    "do i have",
    "is this",
    "what condition",
    "what disease",
    "what's wrong with me",
    "identify my condition",
    "tell me what i have",
    "figure out what's wrong",
    // Dosing
    "dose",
    "dosage",
    "how much",
    "how many pills",
    "medication amount",
    "prescribe",
    "prescription for",
    "should i take",
    "when to take",
    "how often to take",
    "milligrams",
    "mg of",
    "adjust my dose",
    "increase dose",
    "decrease dose",
    // Triage
    "should i go to",
    "do i need to see",
    "emergency room",
    "urgent care",
    "call 911",
    "is this urgent",
    "how serious is",
    "should i worry",
    "do i need emergency",
    "go to er",
    "go to hospital",
    "seek immediate care",
    // Image interpretation
    "interpret image",
    "read x-ray",
    "read my scan",
    "what does this image show",
    "analyze this scan",
    "what's in this x-ray",
    "read my mri",
    "interpret ct scan",
    "what does my ultrasound show",
];

/// Phrases indicating potentially life-threatening situations that require
/// escalation to emergency services rather than an answer.
pub static EMERGENCY_KEYWORDS: &[&str] = &[
    // Cardiovascular
    "chest pain",
    "heart attack",
    "crushing chest",
    "pressure in chest",
    // Respiratory
    "trouble breathing",
    "can't breathe",
    "difficulty breathing",
    "shortness of breath severe",
    "gasping for air",
    "choking",
    "throat swelling",
    "difficulty swallowing",
    "anaphylaxis",
    "allergic reaction severe",
    // Neurological
    "stroke",
    "facial drooping",
    "face drooping",
    "arm weakness sudden",
    "can't move arm",
    "trouble speaking",
    "slurred speech",
    "sudden confusion",
    "can't understand",
    "severe headache sudden",
    "worst headache",
    "head injury",
    "loss of consciousness",
    "passed out",
    "unconscious",
    "seizure",
    "convulsion",
    // Hemorrhage
    "severe bleeding",
    "bleeding won't stop",
    "blood everywhere",
    "hemorrhage",
    "bleeding heavily",
    "coughing up blood",
    "vomiting blood",
    "blood in stool severe",
    // Mental health
    "self-harm",
    "hurt myself",
    "end my life",
    "suicidal",
    "suicide plan",
    "want to die",
    "killing myself",
    // Toxicological
    "overdose",
    "took too many pills",
    "poisoning",
    "swallowed poison",
    "ingested chemicals",
    // Abdominal
    "severe abdominal pain",
    "appendicitis",
    "burst appendix",
    "severe stomach pain",
    // Pediatric
    "high fever infant",
    "baby not breathing",
    "child unresponsive",
    "infant lethargic",
    // Dermatological
    "purple spots rash",
    "petechiae",
    "non-blanching rash",
];
