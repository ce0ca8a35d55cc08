//! Built-in vocabulary tables
//!
//! Always available, independent of any provider. Entries are lowercase;
//! casing is applied when a name is rendered.

pub const ADJECTIVES: &[&str] = &[
    "ancient", "amber", "arctic", "ashen", "astral", "atomic", "bitter", "black", "blazing",
    "bleeding", "blind", "blue", "bold", "brazen", "bright", "broken", "burning", "buried",
    "candid", "careless", "cheap", "chrome", "cold", "cosmic", "crimson", "crooked", "cruel",
    "crystal", "cursed", "dark", "dead", "deep", "desert", "distant", "dizzy", "drowned",
    "dusty", "early", "electric", "empty", "endless", "eternal", "faded", "fallen", "feral",
    "fierce", "final", "flaming", "foreign", "forgotten", "fragile", "frozen", "funky",
    "ghostly", "gilded", "glass", "golden", "gentle", "glowing", "grand", "gravity", "grey",
    "hollow", "holy", "honest", "hungry", "hypnotic", "iron", "ivory", "jagged", "jaded",
    "kinetic", "lazy", "liquid", "lonely", "lost", "loud", "lucid", "lunar", "mad", "magnetic",
    "marble", "midnight", "mighty", "misty", "modern", "molten", "neon", "nervous", "noble",
    "nocturnal", "obsidian", "odd", "old", "pale", "paper", "phantom", "plastic", "polar",
    "primal", "purple", "quiet", "radiant", "ragged", "rapid", "raw", "reckless", "restless",
    "rising", "rogue", "rotten", "royal", "rusty", "sacred", "savage", "scarlet", "secret",
    "shadow", "shallow", "sharp", "silent", "silver", "sleepless", "slow", "smoky", "solar",
    "sonic", "static", "steady", "stellar", "stolen", "strange", "sudden", "sullen", "super",
    "sweet", "swift", "tender", "thin", "tidal", "tired", "toxic", "twisted", "urban",
    "velvet", "violent", "violet", "vintage", "wandering", "wicked", "wild", "winter",
    "wooden", "young", "zealous",
];

pub const NOUNS: &[&str] = &[
    "anchor", "angel", "animal", "arrow", "ash", "atlas", "avenue", "bandit", "beacon", "bear",
    "bell", "bird", "blade", "bloom", "bone", "border", "breaker", "bridge", "cactus",
    "canyon", "captain", "cathedral", "chain", "chapel", "circle", "city", "cloud", "comet",
    "coyote", "crow", "crown", "current", "dagger", "dawn", "desert", "diamond", "dream",
    "drifter", "drum", "dust", "echo", "eclipse", "ember", "engine", "falcon", "feather",
    "fever", "field", "flame", "flood", "flower", "forest", "fortress", "fountain", "fox",
    "frontier", "galaxy", "garden", "ghost", "giant", "glacier", "harbor", "hawk", "heart",
    "hunter", "island", "jackal", "jungle", "kingdom", "knife", "lantern", "lighthouse",
    "lion", "machine", "magnet", "mirror", "monarch", "moon", "mountain", "nebula", "night",
    "ocean", "oracle", "orchard", "outlaw", "panther", "paradise", "phantom", "pilgrim",
    "planet", "prophet", "pyramid", "quarry", "queen", "radio", "raven", "rebel", "reef",
    "river", "rocket", "rose", "ruin", "saint", "satellite", "serpent", "shadow", "signal",
    "siren", "skyline", "snake", "soldier", "spark", "sparrow", "spider", "storm", "stranger",
    "street", "summit", "sunset", "swan", "temple", "thunder", "tide", "tiger", "tower",
    "traveler", "tunnel", "valley", "vampire", "viper", "voltage", "voyager", "wave",
    "whisper", "wildfire", "window", "wolf", "wonder", "wreck", "zenith",
];

/// Base-form verbs; inflected at render time
pub const VERBS: &[&str] = &[
    "awaken", "bleed", "break", "breathe", "burn", "call", "carry", "chase", "climb", "collide",
    "crash", "crawl", "cry", "dance", "dig", "dream", "drift", "drown", "escape", "explode",
    "fade", "fall", "fight", "float", "fly", "follow", "forget", "freeze", "glow", "grow",
    "haunt", "hide", "howl", "hunt", "ignite", "jump", "kneel", "laugh", "leave", "linger",
    "listen", "melt", "move", "pray", "rage", "rise", "roam", "run", "sail", "scream", "shine",
    "shiver", "sing", "sink", "sleep", "slide", "spin", "stand", "steal", "surrender", "swim",
    "swing", "talk", "tremble", "turn", "vanish", "wait", "wake", "walk", "wander", "weep",
    "whisper", "wonder",
];

pub const MUSIC_TERMS: &[&str] = &[
    "anthem", "aria", "ballad", "bass", "beat", "blues", "cadence", "chord", "chorus", "coda",
    "crescendo", "drum", "echo", "encore", "groove", "harmony", "hymn", "lullaby", "melody",
    "octave", "opus", "overture", "prelude", "refrain", "requiem", "rhythm", "riff", "serenade",
    "sonata", "soul", "symphony", "tempo", "tone", "tune", "verse", "vinyl", "waltz",
];

/// Spelled-out numbers for "{number}" slots
pub const NUMBERS: &[&str] = &[
    "two", "three", "four", "five", "seven", "nine", "eleven", "twelve", "thirteen", "hundred",
    "thousand", "million",
];

/// Well-known artist names; generated names must not collide with these
pub const FAMOUS_NAMES: &[&str] = &[
    "the beatles", "the rolling stones", "led zeppelin", "pink floyd", "queen", "nirvana",
    "radiohead", "metallica", "the doors", "the who", "the kinks", "black sabbath",
    "the clash", "the cure", "the smiths", "joy division", "new order", "depeche mode",
    "arctic monkeys", "the strokes", "the killers", "coldplay", "muse", "oasis", "blur",
    "pearl jam", "soundgarden", "foo fighters", "green day", "the ramones", "sex pistols",
    "daft punk", "massive attack", "portishead", "the white stripes", "kings of leon",
    "the national", "arcade fire", "vampire weekend", "florence and the machine",
    "the black keys", "tame impala", "gorillaz", "iron maiden", "judas priest", "slayer",
    "megadeth", "the police", "talking heads", "the velvet underground", "sonic youth",
    "the pixies", "r.e.m.", "u2", "abba", "genesis", "yes", "rush", "kiss", "journey",
    "boston", "toto", "eagles", "the cranberries", "garbage", "the stone roses",
    "yesterday", "imagine", "hey jude", "bohemian rhapsody", "stairway to heaven",
    "smells like teen spirit", "wonderwall", "hotel california", "purple rain",
];

/// Stop words never count as significant and never fill content slots
pub const STOP_WORDS: &[&str] = &[
    "a", "all", "an", "and", "are", "as", "at", "be", "been", "but", "by", "don't", "every",
    "for", "from", "he", "her", "his", "i", "in", "into", "is", "it", "its", "just", "like",
    "me", "my", "no", "not", "of", "on", "onto", "or", "our", "over", "she", "so", "some",
    "than", "that", "the", "their", "them", "then", "these", "they", "this", "those",
    "through", "to", "under", "upon", "was", "we", "were", "when", "where", "while", "with",
    "without", "you", "your",
];

/// Keywords that signal alignment with a genre
pub const GENRE_KEYWORDS: &[(&str, &[&str])] = &[
    ("rock", &["stone", "thunder", "riot", "steel", "fire", "rebel", "highway", "wild"]),
    ("metal", &["iron", "blade", "skull", "doom", "steel", "serpent", "storm", "black"]),
    ("punk", &["riot", "rebel", "broken", "cheap", "static", "street", "noise", "rotten"]),
    ("indie", &["paper", "garden", "quiet", "lantern", "velvet", "window", "sparrow"]),
    ("pop", &["sweet", "neon", "heart", "golden", "dream", "sugar", "bright", "dance"]),
    ("electronic", &["neon", "signal", "voltage", "pulse", "chrome", "circuit", "synthetic", "static"]),
    ("hip-hop", &["street", "crown", "gold", "city", "king", "hustle", "block"]),
    ("jazz", &["blue", "velvet", "midnight", "smoky", "swing", "cadence", "lounge"]),
    ("blues", &["blue", "river", "whiskey", "crossroad", "lonesome", "delta", "dust"]),
    ("folk", &["river", "valley", "wooden", "harvest", "pilgrim", "lantern", "orchard"]),
    ("country", &["dust", "highway", "whiskey", "coyote", "desert", "cowboy", "outlaw"]),
    ("classical", &["sonata", "symphony", "requiem", "aria", "opus", "marble", "ivory"]),
    ("ambient", &["drift", "tide", "glacier", "silent", "cloud", "nebula", "float"]),
    ("soul", &["soul", "velvet", "honey", "golden", "heart", "sweet", "fire"]),
    ("funk", &["groove", "funky", "bass", "electric", "strut", "chrome", "disco"]),
    ("reggae", &["sun", "island", "roots", "zion", "rhythm", "tide", "lion"]),
];

/// Keywords that signal alignment with a mood
pub const MOOD_KEYWORDS: &[(&str, &[&str])] = &[
    ("dark", &["shadow", "black", "night", "ghost", "bleeding", "cursed", "grave", "hollow"]),
    ("energetic", &["electric", "blazing", "rapid", "rocket", "fire", "wild", "kinetic"]),
    ("melancholic", &["faded", "lonely", "rain", "tears", "grey", "empty", "sullen", "weep"]),
    ("uplifting", &["rising", "golden", "bright", "dawn", "radiant", "wonder", "sun"]),
    ("mysterious", &["secret", "phantom", "oracle", "mist", "hidden", "strange", "eclipse"]),
    ("aggressive", &["savage", "violent", "blade", "rage", "feral", "riot", "dagger"]),
    ("romantic", &["rose", "velvet", "heart", "tender", "sweet", "kiss", "moon"]),
    ("chill", &["lazy", "slow", "drift", "tide", "cloud", "gentle", "sunset"]),
    ("happy", &["sunny", "bright", "sweet", "golden", "dance", "wonder", "sugar"]),
    ("sad", &["lonely", "tears", "faded", "grey", "broken", "empty", "weep"]),
];
