//! services/api/src/adapters/seed.rs
//!
//! Demo catalog content loaded into the in-memory store at startup.

use chrono::{TimeZone, Utc};
use kids_learning_core::domain::{
    Activity, ActivityCategory, ActivityContent, ActivityStatus, AgeGroup, Course, CourseStatus,
    DrawingContent, GameContent, Lesson, QuizContent, QuizQuestion, Review, StoryContent,
    TeacherProfile, VerificationStatus, VideoContent,
};
use kids_learning_core::store::RecordStore;

pub fn seed_store() -> RecordStore {
    RecordStore::new(teachers(), courses(), activities())
}

fn teacher(
    id: &str,
    name: &str,
    bio: &str,
    subjects: &[&str],
    certificates: &[&str],
    status: VerificationStatus,
) -> TeacherProfile {
    TeacherProfile {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{}@kidslearn.example", id),
        bio: bio.to_string(),
        avatar: format!("https://avatars.kidslearn.example/{}.png", id),
        subjects: subjects.iter().map(|s| s.to_string()).collect(),
        certificates: certificates.iter().map(|s| s.to_string()).collect(),
        rating: 0.0,
        rating_count: 0,
        reviews: Vec::new(),
        verification_status: status,
        is_verified: status == VerificationStatus::Verified,
    }
}

fn teachers() -> Vec<TeacherProfile> {
    let mut amira = teacher(
        "teacher_amira",
        "Amira Haddad",
        "Primary school maths teacher who turns numbers into games.",
        &["Math", "Coding"],
        &["B.Ed. Primary Education"],
        VerificationStatus::Verified,
    );
    for (n, (parent, rating, comment)) in [
        ("Jordan", 5u8, "My daughter asks for maths time now!"),
        ("Riley", 4u8, "Patient and clear."),
    ]
    .into_iter()
    .enumerate()
    {
        amira.add_review(Review {
            id: format!("review_seed_{}", n + 1),
            teacher_id: "teacher_amira".to_string(),
            parent_id: format!("parent_seed_{}", n + 1),
            parent_name: parent.to_string(),
            course_id: Some("course_math_101".to_string()),
            rating,
            comment: comment.to_string(),
            created_at: Utc
                .with_ymd_and_hms(2024, 3, 1 + n as u32, 9, 0, 0)
                .single()
                .unwrap_or_else(Utc::now),
        });
    }

    vec![
        amira,
        teacher(
            "teacher_pending_approval",
            "Ben Okafor",
            "Science enthusiast and former museum educator.",
            &["Science"],
            &["M.Sc. Biology"],
            VerificationStatus::Pending,
        ),
        teacher(
            "teacher_new",
            "Chloe Martin",
            "Music and art for little hands.",
            &["Music", "Art"],
            &[],
            VerificationStatus::NotSubmitted,
        ),
        teacher(
            "teacher_rejected",
            "Dev Patel",
            "Storyteller and reading coach.",
            &["Reading"],
            &[],
            VerificationStatus::Rejected,
        ),
    ]
}

fn lesson(id: &str, title: &str, minutes: u32) -> Lesson {
    Lesson {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("{} in {} minutes.", title, minutes),
        duration_minutes: minutes,
        video_url: None,
    }
}

fn courses() -> Vec<Course> {
    vec![
        Course {
            id: "course_math_101".to_string(),
            teacher_id: "teacher_amira".to_string(),
            title: "Math Adventures 101".to_string(),
            description: "Counting, adding, and shapes through play.".to_string(),
            category: ActivityCategory::Math,
            age_groups: vec![AgeGroup::Ages3To5, AgeGroup::Ages6To8],
            lessons: vec![
                lesson("lesson_math_1", "Counting to Ten", 10),
                lesson("lesson_math_2", "Adding Apples", 12),
                lesson("lesson_math_3", "Shape Hunt", 15),
            ],
            price_one_time: Some(29.0),
            price_monthly: None,
            status: CourseStatus::Active,
        },
        Course {
            id: "course_coding_kids".to_string(),
            teacher_id: "teacher_amira".to_string(),
            title: "My First Code".to_string(),
            description: "Sequences and loops with friendly robots.".to_string(),
            category: ActivityCategory::Coding,
            age_groups: vec![AgeGroup::Ages9To12],
            lessons: vec![
                lesson("lesson_code_1", "Robot Steps", 15),
                lesson("lesson_code_2", "Loop the Loop", 20),
            ],
            price_one_time: None,
            price_monthly: Some(9.99),
            status: CourseStatus::Active,
        },
        Course {
            id: "course_science_lab".to_string(),
            teacher_id: "teacher_pending_approval".to_string(),
            title: "Kitchen Science Lab".to_string(),
            description: "Safe experiments with things from home.".to_string(),
            category: ActivityCategory::Science,
            age_groups: vec![AgeGroup::Ages6To8, AgeGroup::Ages9To12],
            lessons: vec![lesson("lesson_sci_1", "Volcano in a Cup", 20)],
            price_one_time: Some(19.0),
            price_monthly: Some(4.99),
            status: CourseStatus::Pending,
        },
        Course {
            id: "course_music_draft".to_string(),
            teacher_id: "teacher_new".to_string(),
            title: "Rhythm and Rhymes".to_string(),
            description: "Clapping games and simple songs.".to_string(),
            category: ActivityCategory::Music,
            age_groups: vec![AgeGroup::Ages3To5],
            lessons: Vec::new(),
            price_one_time: None,
            price_monthly: Some(5.0),
            status: CourseStatus::Draft,
        },
    ]
}

fn activities() -> Vec<Activity> {
    vec![
        Activity {
            id: "activity_story_moon".to_string(),
            title: "The Moon Who Couldn't Sleep".to_string(),
            description: "A calm bedtime story.".to_string(),
            category: ActivityCategory::Reading,
            status: ActivityStatus::Approved,
            age_groups: vec![AgeGroup::Ages3To5, AgeGroup::Ages6To8],
            points: 10,
            created_by: None,
            content: ActivityContent::Story(StoryContent {
                text: "Once upon a time, the Moon felt wide awake...".to_string(),
                illustration_url: Some("https://img.kidslearn.example/moon.png".to_string()),
            }),
        },
        Activity {
            id: "activity_quiz_shapes".to_string(),
            title: "Shape Quiz".to_string(),
            description: "Name that shape!".to_string(),
            category: ActivityCategory::Math,
            status: ActivityStatus::Approved,
            age_groups: vec![AgeGroup::Ages3To5],
            points: 15,
            created_by: Some("teacher_amira".to_string()),
            content: ActivityContent::Quiz(QuizContent {
                questions: vec![
                    QuizQuestion {
                        question: "How many sides does a triangle have?".to_string(),
                        options: vec!["2".to_string(), "3".to_string(), "4".to_string()],
                        correct_index: 1,
                    },
                    QuizQuestion {
                        question: "Which shape is round?".to_string(),
                        options: vec![
                            "Square".to_string(),
                            "Circle".to_string(),
                            "Star".to_string(),
                        ],
                        correct_index: 1,
                    },
                ],
            }),
        },
        Activity {
            id: "activity_video_plants".to_string(),
            title: "How Plants Drink".to_string(),
            description: "Watch celery change colour.".to_string(),
            category: ActivityCategory::Science,
            status: ActivityStatus::Pending,
            age_groups: vec![AgeGroup::Ages6To8],
            points: 10,
            created_by: Some("teacher_pending_approval".to_string()),
            content: ActivityContent::Video(VideoContent {
                url: "https://video.kidslearn.example/plants.mp4".to_string(),
                duration_seconds: 240,
            }),
        },
        Activity {
            id: "activity_game_maze".to_string(),
            title: "Robot Maze".to_string(),
            description: "Guide the robot with arrow commands.".to_string(),
            category: ActivityCategory::Coding,
            status: ActivityStatus::Approved,
            age_groups: vec![AgeGroup::Ages6To8, AgeGroup::Ages9To12],
            points: 20,
            created_by: Some("teacher_amira".to_string()),
            content: ActivityContent::Game(GameContent {
                instructions: "Use the arrows to reach the battery.".to_string(),
            }),
        },
        Activity {
            id: "activity_draw_pet".to_string(),
            title: "Draw Your Dream Pet".to_string(),
            description: "Any animal, any colour.".to_string(),
            category: ActivityCategory::Art,
            status: ActivityStatus::Rejected,
            age_groups: vec![AgeGroup::Ages3To5, AgeGroup::Ages6To8],
            points: 5,
            created_by: Some("teacher_new".to_string()),
            content: ActivityContent::Drawing(DrawingContent {
                prompt: "Draw a pet that doesn't exist yet.".to_string(),
            }),
        },
    ]
}
