//! The fixed 20-volume catalog.
//!
//! Pure reference data: one `Book` descriptor per volume, loaded once and
//! never mutated. Generated state (covers, scripts, images) lives in the
//! artifact store and is joined onto this data on demand.

use serde::{Deserialize, Serialize};

/// Number of volumes in the series.
pub const BOOK_COUNT: usize = 20;

/// Nominal page count per volume; guidance for the script generator, not a
/// validated constraint.
pub const PAGES_PER_BOOK: usize = 24;

/// A single volume's descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    /// Stable volume id, 1 through 20. The only valid key namespace for
    /// covers and scripts.
    pub id: u32,
    pub title: String,
    pub summary: String,
    pub key_characters: Vec<String>,
    pub beats: Vec<String>,
    pub moral: String,
}

impl Book {
    /// Create a book descriptor.
    pub fn new(
        id: u32,
        title: impl Into<String>,
        summary: impl Into<String>,
        moral: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            summary: summary.into(),
            key_characters: Vec::new(),
            beats: Vec::new(),
            moral: moral.into(),
        }
    }

    pub fn with_characters(mut self, names: &[&str]) -> Self {
        self.key_characters = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_beats(mut self, beats: &[&str]) -> Self {
        self.beats = beats.iter().map(|b| b.to_string()).collect();
        self
    }
}

/// The full catalog in ascending id order.
pub fn catalog() -> &'static [Book] {
    &CATALOG
}

/// Look up a book by id.
pub fn book(id: u32) -> Option<&'static Book> {
    CATALOG.iter().find(|b| b.id == id)
}

lazy_static::lazy_static! {
    /// The 20 volumes of the series, in reading order.
    pub static ref CATALOG: Vec<Book> = vec![
        Book::new(
            1,
            "Prince Rama\u{2019}s Promise",
            "Birth, virtues, and the brotherhood of the four princes. The divine purpose of Lord Vishnu's descent is explained gently for children.",
            "Dharma begins with family and virtue.",
        )
        .with_characters(&["Rama", "Lakshmana", "Bharata", "Shatrughna", "Dasharatha"])
        .with_beats(&[
            "The gods appeal to Vishnu",
            "King Dasharatha's sacrifice",
            "Birth of the four princes",
            "Rama's early childhood",
            "The bond between brothers",
        ]),
        Book::new(
            2,
            "The Sage\u{2019}s Request",
            "Sage Vishwamitra arrives at the palace seeking Rama's help to protect his sacred yagna (sacrifice) from demons.",
            "Fulfill your duty even when it is challenging.",
        )
        .with_characters(&["Vishwamitra", "Rama", "Lakshmana", "Dasharatha"])
        .with_beats(&[
            "Arrival of Vishwamitra",
            "Dasharatha's hesitation",
            "The journey into the wild",
            "Bala and Atibala mantras",
            "Approaching the forest",
        ]),
        Book::new(
            3,
            "Secrets of the Forest",
            "Rama and Lakshmana face their first trials in the wilderness, learning combat and spiritual discipline.",
            "Courage is the shield of the righteous.",
        )
        .with_characters(&["Rama", "Lakshmana", "Tataka", "Mareecha"])
        .with_beats(&[
            "The curse of Tataka",
            "Rama's first battle",
            "Protecting the Yagna",
            "The defeat of Subahu",
            "Teachings of the Sage",
        ]),
        Book::new(
            4,
            "Sita\u{2019}s Swayamvara",
            "The divine marriage of Rama and Sita after Rama successfully lifts and breaks the mighty bow of Lord Shiva.",
            "True strength is coupled with humility.",
        )
        .with_characters(&["Sita", "Janaka", "Rama", "Lakshmana"])
        .with_beats(&[
            "The kingdom of Mithila",
            "The legend of the Shiva Dhanush",
            "Rama lifts the bow",
            "The bow breaks",
            "The grand wedding",
        ]),
        Book::new(
            5,
            "Ayodhya\u{2019}s Turning Point",
            "The joyous preparations for Rama's coronation are derailed by Queen Kaikeyi's fateful boons.",
            "Words once spoken must be honored.",
        )
        .with_characters(&["Kaikeyi", "Manthara", "Dasharatha", "Rama"])
        .with_beats(&[
            "Coronation plans",
            "Manthara's poison",
            "The two boons",
            "Dasharatha's heartbreak",
            "Rama accepts the news",
        ]),
        Book::new(
            6,
            "Into Exile",
            "Rama, Sita, and Lakshmana depart for the forest, leaving behind the comforts of the palace for 14 years.",
            "Duty comes before personal comfort.",
        )
        .with_characters(&["Rama", "Sita", "Lakshmana", "Citizens of Ayodhya"])
        .with_beats(&[
            "The forest attire",
            "Saying goodbye to mothers",
            "Crossing the Sarayu river",
            "The grief of Ayodhya",
            "The first night in the wild",
        ]),
        Book::new(
            7,
            "Friends in the Wild",
            "The trio meets Guha, the boatman, and Bharata attempts to bring Rama back to the throne.",
            "Loyalty transcends distance and power.",
        )
        .with_characters(&["Guha", "Bharata", "Rama", "Lakshmana"])
        .with_beats(&[
            "Meeting Guha",
            "The search for Rama",
            "Encounter at Chitrakoot",
            "The Padukas (sandals)",
            "Bharata's vow",
        ]),
        Book::new(
            8,
            "Panchavati Days",
            "Life in the peaceful forest of Panchavati, where the trio builds a home and encounters forest spirits.",
            "Contentment can be found in simplicity.",
        )
        .with_characters(&["Rama", "Sita", "Lakshmana", "Shurpanakha"])
        .with_beats(&[
            "Building the cottage",
            "Life with nature",
            "Encounter with Shurpanakha",
            "Lakshmana's warning",
            "The seeds of conflict",
        ]),
        Book::new(
            9,
            "The Golden Deer Trap",
            "Ravana schemes to abduct Sita using the demon Maricha disguised as a beautiful golden deer.",
            "Be wary of illusions and deceit.",
        )
        .with_characters(&["Ravana", "Mareecha", "Sita", "Rama"])
        .with_beats(&[
            "Sita's request",
            "Rama's pursuit",
            "The fake cry for help",
            "Lakshmana Rekha",
            "Ravana's disguise",
        ]),
        Book::new(
            10,
            "Jatayu\u{2019}s Brave Stand",
            "The aged eagle Jatayu fights valiantly to rescue Sita from Ravana's aerial chariot.",
            "Sacrifice in the service of good is eternal.",
        )
        .with_characters(&["Jatayu", "Ravana", "Sita"])
        .with_beats(&[
            "The aerial battle",
            "Jatayu's fall",
            "The search begins",
            "Finding the clues",
            "Jatayu's final breath",
        ]),
        Book::new(
            11,
            "The Vanara Kingdom",
            "Rama and Lakshmana reach Kishkindha and form an alliance with the monkey-king Sugriva and Hanuman.",
            "True friendship is a divine gift.",
        )
        .with_characters(&["Hanuman", "Sugriva", "Rama", "Lakshmana"])
        .with_beats(&[
            "Meeting Hanuman",
            "Pact with Sugriva",
            "The story of Vali",
            "Proving Rama's strength",
            "The plan to search",
        ]),
        Book::new(
            12,
            "Vali and the Hard Choice",
            "The complex conflict between brothers Vali and Sugriva is resolved, ensuring justice for the Vanaras.",
            "Justice must prevail over anger.",
        )
        .with_characters(&["Vali", "Sugriva", "Rama", "Tara"])
        .with_beats(&[
            "The first duel",
            "The missed shot",
            "The second duel",
            "The fall of Vali",
            "Sugriva's coronation",
        ]),
        Book::new(
            13,
            "The Great Search",
            "Vanara search parties travel to the four corners of the earth in search of Sita.",
            "Perseverance leads to success.",
        )
        .with_characters(&["Hanuman", "Angada", "Jambavan", "Sampati"])
        .with_beats(&[
            "Dividing the search",
            "Southern party's struggle",
            "The cave of Swayamprabha",
            "Meeting Sampati",
            "Facing the vast ocean",
        ]),
        Book::new(
            14,
            "Hanuman\u{2019}s Leap",
            "Hanuman expands his size and leaps across the ocean to reach Lanka, overcoming obstacles along the way.",
            "Faith gives wings to the soul.",
        )
        .with_characters(&["Hanuman", "Mainaka", "Surasa", "Simhika"])
        .with_beats(&[
            "Growing giant",
            "The flight over the sea",
            "Test of wit and strength",
            "Sighting Lanka",
            "The shrinking into the city",
        ]),
        Book::new(
            15,
            "Inside Lanka",
            "Hanuman finds Sita in the Ashoka Vatika and delivers Rama's message of hope.",
            "Hope is the light in the darkest hour.",
        )
        .with_characters(&["Hanuman", "Sita", "Trijata", "Ravana"])
        .with_beats(&[
            "Searching the city",
            "The Ashoka Vatika",
            "Witnessing Ravana's threats",
            "Giving the ring",
            "Sita's Choodamani",
        ]),
        Book::new(
            16,
            "The Burning Tail",
            "Hanuman is captured but uses his power to escape, warning Ravana by setting fire to the city.",
            "Wisdom is stronger than chains.",
        )
        .with_characters(&["Hanuman", "Ravana", "Indrajit", "Vibhishana"])
        .with_beats(&[
            "Destroying the garden",
            "The capture",
            "The fire on the tail",
            "Burning the golden city",
            "The return leap",
        ]),
        Book::new(
            17,
            "Building the Bridge",
            "The Vanara army builds the Setu bridge across the sea with floating stones inscribed with 'Rama'.",
            "Collaboration achieves the impossible.",
        )
        .with_characters(&["Rama", "Nala", "Neela", "Vibhishana"])
        .with_beats(&[
            "Vibhishana joins Rama",
            "Requesting the Sea God",
            "The engineering of Nala",
            "The floating stones",
            "The army marches",
        ]),
        Book::new(
            18,
            "Battle for Dharma",
            "The epic war between the Vanara army and Ravana's forces begins on the shores of Lanka.",
            "Truth always triumphs over ego.",
        )
        .with_characters(&["Rama", "Ravana", "Kumbhakarna", "Lakshmana"])
        .with_beats(&[
            "The first charge",
            "Fall of Kumbhakarna",
            "Lakshmana and Indrajit",
            "Sanjivani herb quest",
            "Rama and Ravana meet",
        ]),
        Book::new(
            19,
            "Ravana\u{2019}s Fall",
            "The final duel between Rama and Ravana ends with the victory of Dharma and the release of Sita.",
            "Arrogance is the root of destruction.",
        )
        .with_characters(&["Rama", "Ravana", "Matali", "Sita"])
        .with_beats(&[
            "The celestial chariot",
            "The 10 heads of Ravana",
            "The Brahmastra",
            "The fall of the King",
            "Reunion with Sita",
        ]),
        Book::new(
            20,
            "Home and Harmony",
            "The return to Ayodhya, the grand coronation, and the beginning of Rama-Rajya, a golden age of peace.",
            "A righteous leader brings peace to all.",
        )
        .with_characters(&["Rama", "Sita", "Lakshmana", "Bharata", "Hanuman"])
        .with_beats(&[
            "The flight of Pushpaka",
            "Reunion in Ayodhya",
            "The Coronation ceremony",
            "Rewarding the Vanaras",
            "The legacy of Rama",
        ]),
    ];
}
