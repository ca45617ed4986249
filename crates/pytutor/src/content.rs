//! The static lesson catalog: topics, quiz banks, and pre-defined lessons.
//!
//! All content is immutable data compiled into the binary. The [`Catalog`]
//! builds its lookup indices once, at first use, behind a `OnceLock`; after
//! that every access is a borrow of `'static` data. Unknown topic ids resolve
//! to `None`, never a panic.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Serialize;

// ── Topics ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    Basic,
    Intermediate,
    Advanced,
}

/// One entry in the topic catalog.
#[derive(Debug, Serialize)]
pub struct Topic {
    pub id: &'static str,
    pub title: &'static str,
    pub category: Category,
}

pub const TOPICS: &[Topic] = &[
    // Basic
    Topic { id: "introduction", title: "Introduction to Python", category: Category::Basic },
    Topic { id: "variables", title: "Variables & Data Types", category: Category::Basic },
    Topic { id: "math", title: "Basic Operators", category: Category::Basic },
    Topic { id: "strings", title: "String Operations", category: Category::Basic },
    Topic { id: "control_flow", title: "Control Flow (if/else)", category: Category::Basic },
    Topic { id: "loops", title: "Loops (for/while)", category: Category::Basic },
    Topic { id: "lists", title: "Lists and Arrays", category: Category::Basic },
    Topic { id: "tuples", title: "Tuples", category: Category::Basic },
    Topic { id: "sets", title: "Sets", category: Category::Basic },
    Topic { id: "dictionaries", title: "Dictionaries", category: Category::Basic },
    Topic { id: "functions", title: "Functions", category: Category::Basic },
    // Intermediate
    Topic { id: "modules", title: "Modules and Packages", category: Category::Intermediate },
    Topic { id: "file_handling", title: "File Handling", category: Category::Intermediate },
    Topic { id: "exceptions", title: "Exception Handling", category: Category::Intermediate },
    Topic { id: "oop_basics", title: "OOP Basics", category: Category::Intermediate },
    Topic { id: "classes", title: "Classes and Objects", category: Category::Intermediate },
    // Advanced
    Topic { id: "inheritance", title: "Inheritance and Polymorphism", category: Category::Advanced },
    Topic { id: "decorators", title: "Decorators", category: Category::Advanced },
    Topic { id: "generators", title: "Generators and Iterators", category: Category::Advanced },
    Topic { id: "context_managers", title: "Context Managers", category: Category::Advanced },
    Topic { id: "lambda", title: "Lambda Functions", category: Category::Advanced },
    Topic { id: "comprehensions", title: "List/Dict Comprehensions", category: Category::Advanced },
    Topic { id: "threading", title: "Threading and Multiprocessing", category: Category::Advanced },
    Topic { id: "regex", title: "Regular Expressions", category: Category::Advanced },
    Topic { id: "testing", title: "Unit Testing", category: Category::Advanced },
    Topic { id: "debugging", title: "Debugging Techniques", category: Category::Advanced },
];

// ── Quizzes ──────────────────────────────────────────────────────────────────

/// One multiple-choice question. `correct` indexes into `options`.
#[derive(Debug, Serialize)]
pub struct QuizQuestion {
    pub prompt: &'static str,
    pub options: &'static [&'static str],
    pub correct: usize,
}

impl QuizQuestion {
    /// Grade a learner's choice by option index.
    pub fn check(&self, choice: usize) -> bool {
        choice == self.correct
    }

    /// The text of the correct option.
    pub fn answer(&self) -> &'static str {
        self.options[self.correct]
    }
}

const INTRODUCTION_QUIZ: &[QuizQuestion] = &[
    QuizQuestion {
        prompt: "What function is used to display output in Python?",
        options: &["print()", "display()", "show()", "output()"],
        correct: 0,
    },
    QuizQuestion {
        prompt: "Which symbol is used for single-line comments in Python?",
        options: &["//", "#", "--", "/*"],
        correct: 1,
    },
    QuizQuestion {
        prompt: "What function is used to get input from the user?",
        options: &["input()", "get()", "read()", "scanf()"],
        correct: 0,
    },
];

const VARIABLES_QUIZ: &[QuizQuestion] = &[
    QuizQuestion {
        prompt: "Which of these is a valid variable name?",
        options: &["1st_name", "_name", "my-name", "class"],
        correct: 1,
    },
    QuizQuestion {
        prompt: "What is the data type of x in x = 5.0?",
        options: &["int", "float", "string", "boolean"],
        correct: 1,
    },
    QuizQuestion {
        prompt: "What will be the value of x after: x = 5; x += 3?",
        options: &["5", "3", "8", "53"],
        correct: 2,
    },
    QuizQuestion {
        prompt: "What is the type of None in Python?",
        options: &["NoneType", "null", "void", "undefined"],
        correct: 0,
    },
];

const MATH_QUIZ: &[QuizQuestion] = &[
    QuizQuestion {
        prompt: "What is the result of 7 // 2?",
        options: &["3.5", "3", "4", "2"],
        correct: 1,
    },
    QuizQuestion {
        prompt: "What is the result of 5 ** 2?",
        options: &["7", "10", "25", "52"],
        correct: 2,
    },
    QuizQuestion {
        prompt: "What is the result of True and False?",
        options: &["True", "False", "1", "0"],
        correct: 1,
    },
    QuizQuestion {
        prompt: "What does the \"in\" operator do?",
        options: &[
            "Checks membership in a sequence",
            "Performs multiplication",
            "Checks equality",
            "Assigns values",
        ],
        correct: 0,
    },
];

const INHERITANCE_QUIZ: &[QuizQuestion] = &[QuizQuestion {
    prompt: "What is the purpose of the super() function?",
    options: &[
        "To call methods from the parent class",
        "To create a new instance",
        "To delete an object",
        "To override a method",
    ],
    correct: 0,
}];

const DECORATORS_QUIZ: &[QuizQuestion] = &[QuizQuestion {
    prompt: "What is a decorator in Python?",
    options: &[
        "A function that takes another function as argument",
        "A class method",
        "A type of loop",
        "A built-in function",
    ],
    correct: 0,
}];

const QUIZZES: &[(&str, &[QuizQuestion])] = &[
    ("introduction", INTRODUCTION_QUIZ),
    ("variables", VARIABLES_QUIZ),
    ("math", MATH_QUIZ),
    ("inheritance", INHERITANCE_QUIZ),
    ("decorators", DECORATORS_QUIZ),
];

// ── Lessons ──────────────────────────────────────────────────────────────────

/// A pre-defined lesson: summary text plus hand-written example programs.
/// Every example runs under the sandbox's default allowlist.
#[derive(Debug, Serialize)]
pub struct Lesson {
    pub topic: &'static str,
    pub summary: &'static str,
    pub examples: &'static [(&'static str, &'static str)],
}

const LESSONS: &[Lesson] = &[
    Lesson {
        topic: "introduction",
        summary: "First steps: printing, arithmetic, and simple variables.",
        examples: &[
            (
                "Number Operations",
                "num1 = 12.0\n\
                 num2 = 5.0\n\
                 \n\
                 print(f\"Sum: {num1 + num2}\")\n\
                 print(f\"Difference: {num1 - num2}\")\n\
                 print(f\"Product: {num1 * num2}\")\n\
                 print(f\"Division: {num1 / num2}\")\n\
                 print(f\"Floor Division: {num1 // num2}\")\n\
                 print(f\"Power: {num1 ** num2}\")\n",
            ),
            (
                "Temperature Converter",
                "celsius = 21.5\n\
                 fahrenheit = (celsius * 9/5) + 32\n\
                 kelvin = celsius + 273.15\n\
                 \n\
                 print(f\"{celsius}C = {fahrenheit}F\")\n\
                 print(f\"{celsius}C = {kelvin}K\")\n",
            ),
        ],
    },
    Lesson {
        topic: "loops",
        summary: "Iteration patterns: counting, accumulating, and testing numbers.",
        examples: &[
            (
                "Fibonacci Sequence",
                "def fibonacci(n):\n\
                 \x20   sequence = []\n\
                 \x20   a, b = 0, 1\n\
                 \x20   for _ in range(n):\n\
                 \x20       sequence.append(a)\n\
                 \x20       a, b = b, a + b\n\
                 \x20   return sequence\n\
                 \n\
                 print(\"First 10 Fibonacci numbers:\")\n\
                 print(fibonacci(10))\n",
            ),
            (
                "Prime Number Checker",
                "def is_prime(n):\n\
                 \x20   if n < 2:\n\
                 \x20       return False\n\
                 \x20   for i in range(2, int(n ** 0.5) + 1):\n\
                 \x20       if n % i == 0:\n\
                 \x20           return False\n\
                 \x20   return True\n\
                 \n\
                 for num in range(1, 21):\n\
                 \x20   print(f\"{num} is {'prime' if is_prime(num) else 'not prime'}\")\n",
            ),
        ],
    },
    Lesson {
        topic: "functions",
        summary: "Defining functions, branching on arguments, and grouping behavior in classes.",
        examples: &[
            (
                "Grade Calculator",
                "def calculate_grade(score):\n\
                 \x20   if score >= 90:\n\
                 \x20       return 'A'\n\
                 \x20   elif score >= 80:\n\
                 \x20       return 'B'\n\
                 \x20   elif score >= 70:\n\
                 \x20       return 'C'\n\
                 \x20   elif score >= 60:\n\
                 \x20       return 'D'\n\
                 \x20   else:\n\
                 \x20       return 'F'\n\
                 \n\
                 scores = [95, 88, 72, 65, 45]\n\
                 for score in scores:\n\
                 \x20   print(f\"Score {score}: Grade {calculate_grade(score)}\")\n",
            ),
            (
                "Word Counter",
                "def count_words(text):\n\
                 \x20   words = text.split()\n\
                 \x20   word_count = {}\n\
                 \x20   for word in words:\n\
                 \x20       word = word.lower().strip('.,!?')\n\
                 \x20       word_count[word] = word_count.get(word, 0) + 1\n\
                 \x20   return word_count\n\
                 \n\
                 sample = \"The quick brown fox jumps over the lazy dog. The dog sleeps.\"\n\
                 for word, count in count_words(sample).items():\n\
                 \x20   print(f\"'{word}': {count} times\")\n",
            ),
            (
                "Simple Banking System",
                "class BankAccount:\n\
                 \x20   def __init__(self, balance=0):\n\
                 \x20       self.balance = balance\n\
                 \n\
                 \x20   def deposit(self, amount):\n\
                 \x20       if amount > 0:\n\
                 \x20           self.balance += amount\n\
                 \x20           return f\"Deposited ${amount}. New balance: ${self.balance}\"\n\
                 \x20       return \"Invalid deposit amount\"\n\
                 \n\
                 \x20   def withdraw(self, amount):\n\
                 \x20       if 0 < amount <= self.balance:\n\
                 \x20           self.balance -= amount\n\
                 \x20           return f\"Withdrew ${amount}. New balance: ${self.balance}\"\n\
                 \x20       return \"Insufficient funds or invalid amount\"\n\
                 \n\
                 account = BankAccount(1000)\n\
                 print(account.deposit(500))\n\
                 print(account.withdraw(200))\n\
                 print(account.withdraw(2000))\n\
                 print(f\"Final balance: ${account.balance}\")\n",
            ),
        ],
    },
];

// ── Catalog ──────────────────────────────────────────────────────────────────

/// Immutable aggregate of topics, quiz banks, and lessons, indexed by topic id.
pub struct Catalog {
    topics_by_id: HashMap<&'static str, &'static Topic>,
    quizzes_by_id: HashMap<&'static str, &'static [QuizQuestion]>,
    lessons_by_id: HashMap<&'static str, &'static Lesson>,
}

impl Catalog {
    fn build() -> Self {
        Self {
            topics_by_id: TOPICS.iter().map(|t| (t.id, t)).collect(),
            quizzes_by_id: QUIZZES.iter().copied().collect(),
            lessons_by_id: LESSONS.iter().map(|l| (l.topic, l)).collect(),
        }
    }

    /// The process-wide catalog, built on first access.
    pub fn global() -> &'static Catalog {
        static INSTANCE: OnceLock<Catalog> = OnceLock::new();
        INSTANCE.get_or_init(Catalog::build)
    }

    /// All topics, in catalog order.
    pub fn topics(&self) -> &'static [Topic] {
        TOPICS
    }

    pub fn topic(&self, id: &str) -> Option<&'static Topic> {
        self.topics_by_id.get(id).copied()
    }

    pub fn quiz(&self, topic_id: &str) -> Option<&'static [QuizQuestion]> {
        self.quizzes_by_id.get(topic_id).copied()
    }

    pub fn lesson(&self, topic_id: &str) -> Option<&'static Lesson> {
        self.lessons_by_id.get(topic_id).copied()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
