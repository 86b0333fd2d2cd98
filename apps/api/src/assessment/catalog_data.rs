//! Built-in questionnaire and archetype tables.

use std::collections::BTreeMap;

use crate::assessment::catalog::{
    Archetype, Catalog, CompetencyQuestion, Course, Question, Trait,
};

use Trait::{Agreeableness, Conscientiousness, Extraversion, Neuroticism, Openness};

/// (id, text, trait, reverse)
const PERSONALITY_QUESTIONS: &[(&str, &str, Trait, bool)] = &[
    ("P1", "I do my work carefully and in an orderly way.", Conscientiousness, false),
    ("P2", "I prefer to work without making a plan.", Conscientiousness, true),
    ("P3", "I feel comfortable in social settings.", Extraversion, false),
    ("P4", "Meeting new people excites me.", Extraversion, false),
    ("P5", "I usually stay calm in stressful situations.", Neuroticism, true),
    ("P6", "I worry too much about small things.", Neuroticism, false),
    ("P7", "I like finding creative solutions in my work.", Openness, false),
    ("P8", "I try to understand different points of view.", Openness, false),
    ("P9", "I prioritize the needs of others.", Agreeableness, false),
    ("P10", "I try to be conciliatory in conflicts.", Agreeableness, false),
    ("P11", "I finish my tasks on time.", Conscientiousness, false),
    ("P12", "My mood changes often.", Neuroticism, false),
    ("P13", "I enjoy speaking in front of a group.", Extraversion, false),
    ("P14", "Thinking about abstract and theoretical topics interests me.", Openness, false),
    ("P15", "I believe people are well-intentioned.", Agreeableness, false),
    ("P16", "I hesitate to express myself.", Extraversion, true),
    ("P17", "Once I start something I see it through to the end.", Conscientiousness, false),
    ("P18", "I am sensitive to criticism.", Neuroticism, false),
    ("P19", "I keep my workspace tidy.", Conscientiousness, false),
    ("P20", "Helping others makes me happy.", Agreeableness, false),
];

/// (id, text, category)
const INTEREST_QUESTIONS: &[(&str, &str, &str)] = &[
    ("I1", "I like engaging with art.", "Creativity"),
    ("I2", "I enjoy doing sports.", "Physical"),
    ("I3", "Nature walks and camping appeal to me.", "Nature"),
    ("I4", "Technology and innovation interest me.", "Technology"),
    ("I5", "I enjoy writing creative pieces and stories.", "Creativity"),
    ("I6", "Listening to or playing music does me good.", "Art"),
    ("I7", "I would like to take part in community service or volunteering.", "Social"),
    ("I8", "I enjoy reading scientific articles.", "Scientific"),
    ("I9", "I like to travel.", "Adventure"),
    ("I10", "I enjoy taking and editing photos.", "Creativity"),
    ("I11", "Chatting with people and making new friends interests me.", "Social"),
    ("I12", "Handicrafts give me peace of mind.", "Creativity"),
    ("I13", "I like playing games (board games, video games).", "Entertainment"),
    ("I14", "Getting to know different cultures interests me.", "Social"),
    ("I15", "I enjoy tasks that require leadership.", "Leadership"),
];

struct ArchetypeSpec {
    name: &'static str,
    description: &'static str,
    profile: &'static [(Trait, f64)],
    careers: &'static [&'static str],
    courses: &'static [&'static str],
    keywords: &'static [&'static str],
    /// (id, text)
    competency: &'static [(&'static str, &'static str)],
}

const ARCHETYPES: &[ArchetypeSpec] = &[
    ArchetypeSpec {
        name: "Innovative Explorer",
        description: "You are creative, curious and love discovering new ideas.",
        profile: &[(Openness, 5.0), (Conscientiousness, 3.0), (Extraversion, 4.0)],
        careers: &["Product Designer", "Entrepreneur", "Advertising Creative", "UX/UI Designer"],
        courses: &["Creative Thinking Techniques", "Entrepreneurship 101", "UX/UI Fundamentals"],
        keywords: &["creativity", "design", "entrepreneurship", "innovation", "ideas", "discovery"],
        competency: &[
            ("IE1", "How would you rate your knowledge of creative thinking techniques (e.g. brainstorming, SCAMPER)?"),
            ("IE2", "How much do you know about new product design processes?"),
            ("IE3", "What is your knowledge of core entrepreneurship concepts (e.g. business plan, MVP)?"),
            ("IE4", "How well can you use UX/UI design tools (e.g. Figma, Sketch)?"),
            ("IE5", "How experienced are you in innovation management and idea development?"),
        ],
    },
    ArchetypeSpec {
        name: "Methodical Expert",
        description: "You are planned, disciplined, detail-oriented and enjoy building systems.",
        profile: &[(Conscientiousness, 5.0), (Openness, 2.0), (Neuroticism, 2.0)],
        careers: &["Engineer", "Data Analyst", "Accountant", "Project Manager"],
        courses: &["Project Management", "Excel and Data Analysis", "Process Improvement"],
        keywords: &["engineering", "analysis", "planning", "systems", "detail", "discipline"],
        competency: &[
            ("ME1", "What is your knowledge of project management methodologies (e.g. Scrum, Kanban)?"),
            ("ME2", "How proficient are you with Excel and Google Sheets?"),
            ("ME3", "What is your knowledge of process improvement techniques (e.g. Lean, Six Sigma)?"),
            ("ME4", "How competent are you with data analysis tools (e.g. Power BI, Tableau)?"),
            ("ME5", "How effectively can you use planning and time management techniques?"),
        ],
    },
    ArchetypeSpec {
        name: "Social Leader",
        description: "You are charismatic, persuasive, sociable and have strong leadership qualities.",
        profile: &[(Extraversion, 5.0), (Agreeableness, 4.0), (Conscientiousness, 4.0)],
        careers: &["Sales Manager", "Community Leader", "Public Relations Specialist", "Politician"],
        courses: &["Leadership and Effective Communication", "Community Management", "Negotiation Techniques"],
        keywords: &["leadership", "management", "communication", "persuasion", "social", "community"],
        competency: &[
            ("SL1", "At what level are your leadership skills (team management, motivation)?"),
            ("SL2", "What do you know about community management?"),
            ("SL3", "How developed are your persuasion and negotiation skills?"),
            ("SL4", "How strong are your presentation and public speaking skills?"),
            ("SL5", "How experienced are you in crisis management and conflict resolution?"),
        ],
    },
    ArchetypeSpec {
        name: "Team Player",
        description: "You are helpful, empathetic, supportive and open to collaboration.",
        profile: &[(Agreeableness, 5.0), (Extraversion, 4.0), (Neuroticism, 2.0)],
        careers: &["Teacher", "Social Worker", "Nurse", "Customer Representative"],
        courses: &["Empathy and Active Listening", "Crisis Management", "Introduction to Psychology"],
        keywords: &["helping", "education", "support", "teamwork", "empathy", "collaboration"],
        competency: &[
            ("TP1", "How would you rate your empathy and active listening skills?"),
            ("TP2", "What is your level of psychology and basic counselling knowledge?"),
            ("TP3", "How competent are you at taking a supportive role in a crisis?"),
            ("TP4", "How good are you at collaboration and coordination within a team?"),
            ("TP5", "What do you know about planning and delivering training?"),
        ],
    },
    ArchetypeSpec {
        name: "Cool-headed Strategist",
        description: "You are logical, composed, analytical and stay calm in a crisis.",
        profile: &[(Neuroticism, 1.0), (Conscientiousness, 5.0), (Openness, 3.0)],
        careers: &["Financial Advisor", "Crisis Manager", "Business Analyst", "Lawyer"],
        courses: &["Financial Literacy", "Risk Analysis", "Strategic Planning"],
        keywords: &["strategy", "finance", "analysis", "logic", "crisis", "risk"],
        competency: &[
            ("CS1", "What do you know about financial analysis and reporting?"),
            ("CS2", "What is your knowledge of risk analysis methods (e.g. SWOT, PEST)?"),
            ("CS3", "How competent are you at strategic planning?"),
            ("CS4", "How well can you make logical decisions during a crisis?"),
            ("CS5", "How literate are you in law and contracts?"),
        ],
    },
    ArchetypeSpec {
        name: "Dreamy Artist",
        description: "You have an emotional, original spirit with a strong aesthetic sense and a pull toward art.",
        profile: &[(Openness, 5.0), (Neuroticism, 4.0), (Agreeableness, 4.0)],
        careers: &["Painter", "Musician", "Writer", "Actor", "Photographer"],
        courses: &["Art History", "Creative Writing", "Photography Fundamentals"],
        keywords: &["art", "music", "writing", "aesthetics", "emotion", "imagination"],
        competency: &[
            ("DA1", "What do you know about art history and its core concepts?"),
            ("DA2", "How well do you know creative writing techniques?"),
            ("DA3", "What do you know about basic photography techniques?"),
            ("DA4", "What is your level of music theory or instrument playing?"),
            ("DA5", "How competent are you in theatre and the performing arts?"),
        ],
    },
    ArchetypeSpec {
        name: "Scientific Researcher",
        description: "You have a curious, meticulous, questioning mind committed to the scientific method.",
        profile: &[(Openness, 4.0), (Conscientiousness, 5.0), (Extraversion, 2.0)],
        careers: &["Academic", "Research Assistant", "Data Scientist", "Biotechnologist"],
        courses: &["Scientific Research Methods", "Statistics", "Data Science with Python"],
        keywords: &["science", "research", "data", "technology", "curiosity", "questioning"],
        competency: &[
            ("SR1", "What do you know about scientific research methods?"),
            ("SR2", "What is your level in statistics and data analysis?"),
            ("SR3", "How well can you use programming languages such as Python or R?"),
            ("SR4", "How strong are your academic writing and literature review skills?"),
            ("SR5", "What do you know about laboratory techniques and experiment design?"),
        ],
    },
    ArchetypeSpec {
        name: "Practical Problem Solver",
        description: "You think fast, focus on solutions, are pragmatic and like making decisions.",
        profile: &[(Conscientiousness, 4.0), (Extraversion, 3.0), (Neuroticism, 2.0)],
        careers: &["Technical Support Specialist", "Operations Manager", "Logistics Manager", "Mechanic"],
        courses: &["Problem Solving Techniques", "Logistics Management", "Basic Mechanics"],
        keywords: &["solutions", "operations", "practical", "technical", "speed", "decisions"],
        competency: &[
            ("PS1", "What do you know about problem solving techniques (e.g. 5W1H, Ishikawa)?"),
            ("PS2", "How much do you know about technical support processes?"),
            ("PS3", "What do you know about logistics and supply chain management?"),
            ("PS4", "What is your level of basic mechanics and technical maintenance?"),
            ("PS5", "How competent are you with operations management processes?"),
        ],
    },
    ArchetypeSpec {
        name: "Caring Nurturer",
        description: "You are compassionate, people-focused and put the needs of others first.",
        profile: &[(Agreeableness, 5.0), (Neuroticism, 3.0), (Extraversion, 3.0)],
        careers: &["Psychologist", "Counsellor", "Child Development Specialist", "Elderly Care Specialist"],
        courses: &["Counselling Skills", "Child Development", "Ethics in Healthcare"],
        keywords: &["psychology", "health", "people", "compassion", "needs", "care"],
        competency: &[
            ("CN1", "What do you know about psychological counselling methods?"),
            ("CN2", "What is your level of knowledge about child development?"),
            ("CN3", "What do you know about ethical rules in healthcare?"),
            ("CN4", "What do you know about elderly care and support methods?"),
            ("CN5", "How good are you at analysing and planning for people's needs?"),
        ],
    },
    ArchetypeSpec {
        name: "Adventure Seeker",
        description: "You are brave, free-spirited, experience-driven and dislike routine.",
        profile: &[(Extraversion, 5.0), (Openness, 5.0), (Conscientiousness, 2.0)],
        careers: &["Travel Writer", "Outdoor Guide", "Photographer", "Freelancer"],
        courses: &["Outdoor Sports Training", "Freelancing Strategies", "Travel Planning"],
        keywords: &["adventure", "travel", "sports", "freedom", "experience", "courage"],
        competency: &[
            ("AS1", "How good are you at travel planning and destination research?"),
            ("AS2", "What do you know about outdoor sports (e.g. camping, climbing)?"),
            ("AS3", "What is your level of freelancing techniques and platform knowledge?"),
            ("AS4", "How strong are your photography and video production skills?"),
            ("AS5", "How open are you to cultural diversity and new experiences?"),
        ],
    },
];

const TRAIT_FALLBACKS: &[(Trait, &str)] = &[
    (Openness, "Innovative Explorer"),
    (Conscientiousness, "Methodical Expert"),
    (Extraversion, "Social Leader"),
    (Agreeableness, "Team Player"),
    (Neuroticism, "Cool-headed Strategist"),
];

pub(crate) fn build() -> Catalog {
    let mut questions: Vec<Question> = PERSONALITY_QUESTIONS
        .iter()
        .map(|(id, text, t, reverse)| Question {
            id: id.to_string(),
            text: text.to_string(),
            trait_tag: Some(*t),
            category: None,
            reverse: *reverse,
        })
        .collect();
    questions.extend(INTEREST_QUESTIONS.iter().map(|(id, text, category)| Question {
        id: id.to_string(),
        text: text.to_string(),
        trait_tag: None,
        category: Some(category.to_string()),
        reverse: false,
    }));

    let archetypes = ARCHETYPES
        .iter()
        .map(|spec| Archetype {
            name: spec.name.to_string(),
            description: spec.description.to_string(),
            profile: spec.profile.iter().copied().collect(),
            careers: spec.careers.iter().map(|c| c.to_string()).collect(),
            courses: spec.courses.iter().map(|c| Course::from_title(*c)).collect(),
            keywords: spec.keywords.iter().map(|k| k.to_string()).collect(),
            competency_questions: spec
                .competency
                .iter()
                .map(|(id, text)| CompetencyQuestion {
                    id: id.to_string(),
                    text: text.to_string(),
                    kind: "scale".to_string(),
                })
                .collect(),
        })
        .collect();

    let trait_fallbacks: BTreeMap<Trait, String> = TRAIT_FALLBACKS
        .iter()
        .map(|(t, name)| (*t, name.to_string()))
        .collect();

    Catalog::new(questions, archetypes, trait_fallbacks)
}
