//! Local question catalog and the keyword inverted index built from it.
//!
//! The catalog is the static topic -> question table used for random
//! selection; the index maps every significant token of every question
//! to the questions containing it, which is what makes adaptive
//! counter-questioning a hash lookup instead of a scan.

use rand::seq::SliceRandom;
use std::collections::{HashMap, HashSet};

use crate::question::normalize_id;

/// Tokens ignored when building the index and scanning transcripts.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "may", "might", "can", "must",
    "shall", "need", "dare", "ought", "used", "to", "of", "in", "for", "on", "with", "at", "by",
    "from", "up", "about", "into", "over", "after", "beneath", "under", "above", "and", "but",
    "or", "nor", "not", "so", "yet", "both", "either", "neither", "only", "own", "same", "than",
    "too", "very", "just", "also", "now", "here", "there", "when", "where", "why", "how", "all",
    "each", "every", "few", "more", "most", "other", "some", "such", "no", "any", "this", "that",
    "these", "those", "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us",
    "them", "my", "your", "his", "its", "our", "their", "what", "which", "who", "whom", "whose",
    "if", "then", "else", "because", "while", "although", "though", "unless", "until", "before",
    "since", "during", "through", "explain", "difference", "between", "scenario", "give",
];

const MIN_TOKEN_LEN: usize = 3;

/// Static topic -> (question, expected answer) table.
#[derive(Debug, Default)]
pub struct QuestionCatalog {
    topics: Vec<String>,
    by_topic: HashMap<String, Vec<(String, String)>>,
}

impl QuestionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in seven-topic interview bank.
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();
        for (topic, questions) in DEFAULT_BANK {
            for (question, expected) in *questions {
                catalog.add(*topic, *question, *expected);
            }
        }
        catalog
    }

    pub fn add(
        &mut self,
        topic: impl Into<String>,
        question: impl Into<String>,
        expected: impl Into<String>,
    ) {
        let topic = topic.into();
        if !self.topics.contains(&topic) {
            self.topics.push(topic.clone());
        }
        self.by_topic
            .entry(topic)
            .or_default()
            .push((question.into(), expected.into()));
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn questions_for(&self, topic: &str) -> &[(String, String)] {
        self.by_topic.get(topic).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Uniformly-random question for `topic` whose normalized id is not
    /// in `asked`. Shuffle-then-scan; `None` means the topic is
    /// exhausted for this session.
    pub fn random_unused(
        &self,
        topic: &str,
        asked: &HashSet<String>,
    ) -> Option<(String, String)> {
        let mut options: Vec<&(String, String)> = self.questions_for(topic).iter().collect();
        options.shuffle(&mut rand::thread_rng());
        options
            .into_iter()
            .find(|(q, _)| !asked.contains(&normalize_id(q)))
            .cloned()
    }
}

/// One index hit: the question a keyword points back to.
#[derive(Debug, Clone)]
pub struct IndexedQuestion {
    pub topic: String,
    pub question: String,
    pub expected: String,
}

/// Keyword -> questions inverted index. Immutable after construction.
#[derive(Debug, Default)]
pub struct KeywordIndex {
    entries: HashMap<String, Vec<IndexedQuestion>>,
}

impl KeywordIndex {
    /// Tokenize every catalog question, dropping stop-words and short
    /// tokens, and record which questions each token appears in.
    pub fn build(catalog: &QuestionCatalog) -> Self {
        let mut entries: HashMap<String, Vec<IndexedQuestion>> = HashMap::new();
        for topic in catalog.topics() {
            for (question, expected) in catalog.questions_for(topic) {
                for token in tokenize(question) {
                    let hits = entries.entry(token).or_default();
                    if !hits.iter().any(|h| h.question == *question) {
                        hits.push(IndexedQuestion {
                            topic: topic.clone(),
                            question: question.clone(),
                            expected: expected.clone(),
                        });
                    }
                }
            }
        }
        Self { entries }
    }

    pub fn lookup(&self, keyword: &str) -> &[IndexedQuestion] {
        self.entries
            .get(keyword)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Longest indexed token present in the transcript; the adaptive
    /// follow-up candidate. Ties are broken arbitrarily.
    pub fn longest_match(&self, transcript: &str) -> Option<String> {
        tokenize(transcript)
            .filter(|t| self.entries.contains_key(t))
            .max_by_key(String::len)
    }
}

/// Significant tokens of a text: lowercase alphanumeric runs, at least
/// [`MIN_TOKEN_LEN`] chars, not a stop-word.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= MIN_TOKEN_LEN && !STOP_WORDS.contains(t))
        .map(str::to_string)
        .collect::<Vec<_>>()
        .into_iter()
}

type TopicBank = (&'static str, &'static [(&'static str, &'static str)]);

const DEFAULT_BANK: &[TopicBank] = &[
    (
        "Java",
        &[
            (
                "What is the difference between JDK, JRE, and JVM?",
                "JDK is for development, JRE for running, JVM executes bytecode.",
            ),
            (
                "Explain the concept of OOP in Java.",
                "OOP uses objects and classes, focusing on encapsulation, inheritance, polymorphism.",
            ),
            (
                "A production list is throwing NullPointerException occasionally. How do you handle this efficiently?",
                "Check for nulls before access, use Optional, or basic if-checks.",
            ),
            (
                "How would you design a thread-safe Singleton class?",
                "Use double-checked locking, static inner helper class, or Enum singleton.",
            ),
            (
                "What happens if you try to modify a collection while iterating over it?",
                "It throws ConcurrentModificationException. Use Iterator.remove() or concurrent collections.",
            ),
            (
                "Explain the difference between HashMap and Hashtable.",
                "HashMap is non-synchronized and allows nulls; Hashtable is synchronized.",
            ),
            (
                "How would you handle a memory leak in a Java application?",
                "Use a profiler (like VisualVM) to analyze heap dump and find objects retaining memory.",
            ),
            (
                "Scenario: You need to read a 10GB file in Java with only 2GB RAM. How do you do it?",
                "Use Streams or memory-mapped files to read line-by-line instead of loading all at once.",
            ),
        ],
    ),
    (
        "Python",
        &[
            (
                "What is the difference between a list and a tuple?",
                "Lists are mutable, tuples are immutable.",
            ),
            (
                "Explain the use of decorators in Python.",
                "Decorators modify the behavior of a function or class using @symbol.",
            ),
            (
                "How is memory managed in Python?",
                "Python uses a private heap and automatic garbage collection with reference counting.",
            ),
            (
                "Scenario: Your Python script is running too slow processing data. How do you optimize it?",
                "Use profiling to find bottlenecks, vectorization with NumPy, or parallelism.",
            ),
            (
                "What is the difference between deep copy and shallow copy?",
                "Shallow copy copies references, deep copy creates new objects recursively.",
            ),
            (
                "Explain generators vs lists. When would you use a generator?",
                "Generators yield items one by one (memory efficient), lists store everything (memory heavy).",
            ),
            (
                "Difference between multiprocessing and threading in Python?",
                "Threading is limited by the GIL (good for I/O); multiprocessing uses separate processes (good for CPU bound).",
            ),
        ],
    ),
    (
        "JavaScript",
        &[
            (
                "What is the difference between var, let, and const?",
                "Var is function scoped, let/const are block scoped. Const cannot be reassigned.",
            ),
            (
                "Explain the event loop in JavaScript.",
                "It handles asynchronous callbacks by pushing them to the call stack when empty.",
            ),
            (
                "Scenario: A user complains the UI freezes when clicking a button. What could be the cause?",
                "Heavy computation on the main thread blocking the Event Loop. Use Web Workers or async.",
            ),
            (
                "What are Promises and how are they different from Callbacks?",
                "Promises represent future values and avoid 'callback hell' by chaining .then().",
            ),
            (
                "What is a closure? Give a practical use case.",
                "A function retaining access to its outer scope. Used for data privacy/currying.",
            ),
            (
                "Explain 'this' keyword behavior in Arrow functions vs Normal functions.",
                "Arrow functions inherit 'this' from surrounding scope; normal functions define 'this' based on caller.",
            ),
        ],
    ),
    (
        "React",
        &[
            (
                "What are React Hooks?",
                "Functions that let you use state and lifecycle features in functional components.",
            ),
            (
                "Scenario: A component is re-rendering too often, causing lag. How do you fix it?",
                "Use React.memo, useMemo/useCallback to cache values/functions, or verify dependency arrays.",
            ),
            (
                "Explain the difference between State and Props.",
                "State is internal/mutable; Props are external/read-only passed from parent.",
            ),
            (
                "When would you use Redux or Context API over local state?",
                "When state needs to be accessed by many completely unrelated components (global state).",
            ),
            (
                "What is the Virtual DOM and how does it improve performance?",
                "It's a lightweight copy of DOM. React calculates diffs (reconciliation) and updates only changed nodes.",
            ),
        ],
    ),
    (
        "SQL",
        &[
            (
                "What is the difference between INNER JOIN and LEFT JOIN?",
                "Inner join returns matching rows; Left join returns all left rows + matches.",
            ),
            (
                "Scenario: A query is running very slow on a large table. How do you optimize it?",
                "Add Indexes on filtered columns, avoid SELECT *, check execution plan.",
            ),
            (
                "Explain ACID properties.",
                "Atomicity, Consistency, Isolation, Durability - ensuring reliable transactions.",
            ),
            (
                "What is Normalization? Why might you purposefully DE-normalize?",
                "Normalization reduces redundancy. Denormalization improves read performance by reducing joins.",
            ),
            (
                "What is an Index? Are there downsides to having too many?",
                "Indexes speed up reads but slow down writes (INSERT/UPDATE) and consume storage.",
            ),
            (
                "Difference between WHERE and HAVING clause?",
                "WHERE filters rows before grouping; HAVING filters groups after aggregation.",
            ),
        ],
    ),
    (
        "Machine_Learning",
        &[
            (
                "What is the difference between Supervised and Unsupervised learning?",
                "Supervised uses labeled data; Unsupervised uses unlabeled data to find patterns.",
            ),
            (
                "Scenario: Your model has high accuracy on training data but low on test data. What is happening?",
                "Overfitting. Fix by adding data, regularization, or simplifying the model.",
            ),
            (
                "Explain the Bias-Variance tradeoff.",
                "Balancing error from erroneous assumptions (bias) vs sensitivity to noise (variance).",
            ),
            (
                "How do you handle an imbalanced dataset (e.g., 99% benign, 1% fraud)?",
                "Resampling (SMOTE/undersampling), changing metrics (F1/Precision/Recall instead of Accuracy).",
            ),
            (
                "What is a Confusion Matrix?",
                "A table showing True Positives, False Positives, etc., to evaluate classification.",
            ),
        ],
    ),
    (
        "Deep_Learning",
        &[
            (
                "What is Backpropagation?",
                "Algorithm for training NNs by calculating gradients of loss with respect to weights.",
            ),
            (
                "Scenario: Your neural network loss is not decreasing. What could be wrong?",
                "Learning rate too high/low, bad initialization, or incorrect data preprocessing.",
            ),
            (
                "Explain Dropout and why it works.",
                "Randomly disabling neurons during training to force the network to learn robust features (reduces overfitting).",
            ),
            (
                "What is the difference between a CNN and an RNN?",
                "CNNs use spatial features (images); RNNs use temporal/sequential features (text/time-series).",
            ),
            (
                "What is the vanishing gradient problem?",
                "Gradients become zero in deep layers, stopping learning. Fix with ReLU or LSTM/ResNets.",
            ),
        ],
    ),
];
