//! Built-in tag and keyword lists.
//!
//! These are the baseline the filter always starts from. User-supplied
//! additions are merged on top; nothing here can be removed by configuration.

/// Tags that mark a book as narrative fiction. Any match keeps the book,
/// even when excluded subjects are also present.
pub const FICTION_TAGS: &[&str] = &[
    "fiction",
    "science fiction",
    "fantasy",
    "horror",
    "romance",
    "mystery",
    "mystery & detective",
    "crime",
    "thriller",
    "thrillers",
    "suspense",
    "literary",
    "classics",
    "dystopian",
    "cyberpunk",
    "satire",
    "absurdist",
    "noir",
    "paranormal",
    "magical realism",
    "dark fantasy",
    "epic",
    "action & adventure",
    "historical",
    "contemporary",
    "humorous",
    "humor",
    "litrpg",
    "litrpg (literary role-playing game)",
    "science fiction & fantasy",
    "genre fiction",
    "juvenile fiction",
    "young adult fiction",
    "coming of age",
    "alternative history",
    "apocalyptic",
    "hard science fiction",
    "urban",
    "short stories (single author)",
    "collections & anthologies",
    "drama",
    "poetry",
    "vampires",
    "pirates",
    "superheroes",
    "media tie-in",
    "occult & supernatural",
    "time travel",
    "alien contact",
    "space exploration",
    "multiple timelines",
    "love & romance",
];

/// Subjects that exclude a book unless it also carries a fiction tag.
pub const EXCLUDED_SUBJECTS: &[&str] = &[
    // Cooking
    "cooking",
    "baking",
    "courses & dishes",
    "salads",
    "diet & nutrition",
    "vegetables",
    "vegan",
    "vegetarian",
    "quick & easy",
    "herbs; spices; condiments",
    "soups & stews",
    "bread",
    "cakes",
    "ice cream; ices; etc",
    "appetizers",
    "comfort food",
    "canning & preserving",
    "individual chefs & restaurants",
    "rice & grains",
    "dairy",
    "specific ingredients",
    "east asian style",
    "thai",
    "vietnamese",
    "indian & south asian",
    "entertaining",
    "nutrition",
    "weight loss",
    // Non-fiction markers
    "non-fiction",
    "nonfiction",
    "нонфикшн",
    // Computing
    "computers",
    "python",
    "programming",
    "software development & engineering",
    "web programming",
    "web design",
    "web services & apis",
    "javascript",
    "object oriented",
    "networking",
    "quality assurance & testing",
    "business & productivity software",
    "technology",
    "mathematics",
    // Writing craft and reference
    "writing",
    "fiction writing",
    "creative writing",
    "authorship",
    "editing & proofreading",
    "language arts & disciplines",
    "language arts",
    "reference",
    "thesauri",
    "methods",
    "style manuals",
    "writing skills",
    "composition",
    "book notes",
    // History and biography
    "biography & autobiography",
    "history",
    "history & surveys",
    "expeditions & discoveries",
    "medieval",
    "prehistory",
    "prehistoric peoples",
    "scandinavia",
    "russia & the former soviet union",
    "nordic countries",
    "europe",
    "united states",
    "american civil war era",
    "ancient & classical",
    // Self-help and psychology
    "self-help",
    "self help",
    "personal growth",
    "self-management",
    "happiness",
    "motivational",
    "success",
    "time management",
    "memory improvement",
    "journaling",
    "psychology",
    "applied psychology",
    "industrial & organizational psychology",
    "cognitive psychology & cognition",
    "cognitive science",
    "psychotherapy",
    "psychoanalysis",
    "psychopathology",
    "counseling",
    "post-traumatic stress disorder (ptsd)",
    "attention-deficit disorder (add-adhd)",
    "attention deficit disorder (add-adhd)",
    "anxieties & phobias",
    "emotions",
    "personality",
    // Health and spirituality
    "health & fitness",
    "medical",
    "internal medicine",
    "women's health",
    "alternative therapies",
    "healing",
    "body; mind & spirit",
    "spirituality",
    "mysticism",
    "religion",
    "psychology of religion",
    "hallucinogenic drugs and religious experience",
    "ufos & extraterrestrials",
    // Business and education
    "business & economics",
    "project management",
    "careers",
    "education",
    "education & training",
    "teaching",
    "study aids",
    "study skills",
    "study & test-taking skills",
    "assessment; testing & measurement",
    "professional",
    "development",
    "techniques",
    "skills",
    "languages",
    // Social science and philosophy
    "social science",
    "feminism & feminist theory",
    "women's studies",
    "activism & social justice",
    "political",
    "sustainable development",
    "philosophy",
    "existentialism",
    "free will & determinism",
    "aesthetics",
    "metaphysics",
    "science",
    // Sports and art
    "sports & recreation",
    "motor sports",
    "drawing",
    "cartooning",
    "manga",
    "art",
    "comics & graphic novels",
    // Literature about literature
    "literary criticism",
    "literary collections",
    "literary figures",
    "letters",
    "memoirs",
    "personal memoirs",
    "essays",
    // Junk tags seen in the wild
    "ebook",
    "book",
    "non lu",
    "www.it-ebooks.info",
    "soc035000",
    "isbn-13: 9780199238293",
    "subjects",
];

/// Title fragments that exclude an untagged book.
pub const TITLE_KEYWORDS: &[&str] = &[
    "recipe",
    "cookbook",
    "kefir",
    "ferment",
    "nutrition",
    "diet",
    "meal prep",
    "python",
    "javascript",
    "programming",
    "mastering",
    "handbook",
    "learning ipython",
    "design patterns",
    "high performance",
    "unlocked",
    "calibre",
    "quick start guide",
    "writer's guide",
    "emotion amplifiers",
    "save the cat",
    "novel writing",
    "how to write",
    "anatomy of story",
    "emotional craft of fiction",
    "system for writing",
    "home learning year",
    "homeschool",
    "zettelkasten",
];
