//! Built-in reference data used before any local mutation happens.

use crate::models::*;

pub const DEFAULT_NAME: &str = "Alex";
pub const FALLBACK_FOCUS: [&str; 2] = ["Algebra", "Essay Writing"];

pub const SAMPLE_QUESTIONS: &[QuizQuestion] = &[
    QuizQuestion {
        prompt: "Solve: 2x + 6 = 14",
        options: &["x = 4", "x = 6", "x = 8"],
        correct_index: 0,
        topic: "Algebra",
    },
    QuizQuestion {
        prompt: "Choose the best thesis statement",
        options: &[
            "Cats are cute.",
            "This essay will talk about cats.",
            "While cats are adored for independence, their care needs are often underestimated.",
        ],
        correct_index: 2,
        topic: "Essay Writing",
    },
    QuizQuestion {
        prompt: "Which unit is Newton?",
        options: &["Force", "Energy", "Power"],
        correct_index: 0,
        topic: "Physics",
    },
];

const SUBJECT_TOPICS: &[(&str, &str)] = &[
    ("Mathematics", "Algebra"),
    ("English", "Essay Writing"),
    ("Physics", "Physics"),
    ("Chemistry", "Chemistry"),
    ("Biology", "Biology"),
];

pub fn topic_for_subject(subject: &str) -> Option<&'static str> {
    SUBJECT_TOPICS
        .iter()
        .find(|(s, _)| *s == subject)
        .map(|(_, topic)| *topic)
}

pub const TUTORS: &[Tutor] = &[
    Tutor {
        id: 1,
        name: "Tutor Aisha",
        subject: "Mathematics",
        rating: 4.9,
        price: 25,
        bio: "Ex-competition coach, makes algebra fun.",
        availability: &["Mon 8pm", "Wed 9pm", "Sat 10am"],
    },
    Tutor {
        id: 2,
        name: "Tutor Ben",
        subject: "English",
        rating: 4.7,
        price: 22,
        bio: "Essay structure & IELTS tips.",
        availability: &["Tue 8pm", "Thu 8pm"],
    },
    Tutor {
        id: 3,
        name: "Tutor Chen",
        subject: "Physics",
        rating: 4.8,
        price: 28,
        bio: "Concept-first explanations with demos.",
        availability: &["Sat 2pm", "Sun 11am"],
    },
];

pub const BUDDIES: &[Buddy] = &[
    Buddy { id: 11, name: "Alex", subject: "Algebra", message: "Focused on quadratics this week." },
    Buddy { id: 12, name: "Mika", subject: "Essay Writing", message: "Practicing intros & thesis." },
    Buddy { id: 13, name: "Ravi", subject: "Mechanics", message: "Free nightly after 9pm." },
];

pub fn tutor(id: u32) -> Option<&'static Tutor> {
    TUTORS.iter().find(|t| t.id == id)
}

pub fn buddy(id: u32) -> Option<&'static Buddy> {
    BUDDIES.iter().find(|b| b.id == id)
}

pub fn tutor_videos(tutor_id: u32) -> &'static [TutorVideo] {
    match tutor_id {
        1 => &[
            TutorVideo {
                id: "a1",
                title: "Factoring Quadratics: Quick Tips",
                duration: "08:42",
                src: "/videos/aisha_factoring.mp4",
                thumbnail: Some("/FactorQuadratics.jpg"),
            },
            TutorVideo {
                id: "a2",
                title: "Algebra Warm-ups (5 problems)",
                duration: "12:10",
                src: "/videos/aisha_warmups.mp4",
                thumbnail: Some("/AlgebraWarmup.jpg"),
            },
        ],
        2 => &[TutorVideo {
            id: "b1",
            title: "Thesis Statements: Do & Don't",
            duration: "06:58",
            src: "/videos/ben_thesis.mp4",
            thumbnail: Some("/thumbs/ben1.jpg"),
        }],
        3 => &[
            TutorVideo {
                id: "c1",
                title: "Newton's 2nd Law: Worked Examples",
                duration: "09:33",
                src: "/videos/chen_n2l.mp4",
                thumbnail: Some("/thumbs/chen1.jpg"),
            },
            TutorVideo {
                id: "c2",
                title: "Free-Body Diagrams 101",
                duration: "07:05",
                src: "/videos/chen_fbd.mp4",
                thumbnail: Some("/thumbs/chen2.jpg"),
            },
        ],
        _ => &[],
    }
}

pub fn base_feed() -> Vec<FeedPost> {
    vec![
        FeedPost {
            id: "101".to_string(),
            name: "Tom".to_string(),
            content: "Finished 2 hours of Math today ✅".to_string(),
            ts: "2025-08-24".to_string(),
            created_at: None,
        },
        FeedPost {
            id: "102".to_string(),
            name: "Lisa".to_string(),
            content: "Practicing English Essay writing ✍️".to_string(),
            ts: "2025-08-25".to_string(),
            created_at: None,
        },
    ]
}

pub fn initial_suggestions() -> Vec<Suggestion> {
    let entry = |id, name: &str, subjects: &[&str], mutuals| Suggestion {
        id,
        name: name.to_string(),
        subjects: subjects.iter().map(|s| s.to_string()).collect(),
        mutuals,
    };
    vec![
        entry(201, "Nadia", &["Mathematics", "Physics"], 3),
        entry(202, "Irfan", &["English", "Essay Writing"], 2),
        entry(203, "Sofia", &["Biology", "Chemistry"], 1),
        entry(204, "Ken", &["Mathematics", "Chemistry"], 4),
    ]
}

pub const ACTIVITIES: &[Activity] = &[
    Activity {
        id: 9001,
        kind: ActivityKind::Video,
        date: "2025-08-24",
        subject: "Mathematics",
        tutor: Some("Tutor Aisha"),
        title: "Video session with Tutor Aisha",
        notes: Some("Factoring quadratics (ax²+bx+c)"),
        duration_min: Some(45),
    },
    Activity {
        id: 9002,
        kind: ActivityKind::Revision,
        date: "2025-08-24",
        subject: "English",
        tutor: None,
        title: "Revised: Essay thesis & intros",
        notes: Some("Stronger thesis w/ clear stance"),
        duration_min: None,
    },
    Activity {
        id: 9003,
        kind: ActivityKind::Video,
        date: "2025-08-25",
        subject: "Physics",
        tutor: Some("Tutor Chen"),
        title: "Video session with Tutor Chen",
        notes: Some("Newton's Second Law problems"),
        duration_min: Some(30),
    },
    Activity {
        id: 9004,
        kind: ActivityKind::Revision,
        date: "2025-08-26",
        subject: "Mathematics",
        tutor: None,
        title: "Revised: Algebra practice set",
        notes: Some("10 problems on linear equations"),
        duration_min: None,
    },
];
