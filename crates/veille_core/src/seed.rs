//! Built-in demo catalog loaded by `veille load-facts`.

/// `(fact, techno)` pairs, inserted in this order.
pub const SEED_FACTS: &[(&str, &str)] = &[
    (
        "The first computer program was written by Ada Lovelace in 1843.",
        "History",
    ),
    (
        "The word \"bug\" comes from a real moth stuck in a computer in 1947.",
        "History",
    ),
    (
        "JavaScript was created in just 10 days by Brendan Eich in 1995.",
        "JavaScript",
    ),
    (
        "The first website was info.cern.ch, built by Tim Berners-Lee in 1991.",
        "Web",
    ),
    (
        "Python is named after Monty Python's Flying Circus, not the snake.",
        "Python",
    ),
    (
        "Git was created by Linus Torvalds, the creator of Linux.",
        "Git",
    ),
    (
        "The first email was sent in 1971 by Ray Tomlinson.",
        "Email",
    ),
    (
        "React was developed at Facebook and has been open source since 2013.",
        "React",
    ),
    (
        "The first version of PHP was a set of CGI scripts written in C.",
        "PHP",
    ),
    (
        "Docker uses Linux containers to isolate applications.",
        "Docker",
    ),
    (
        "Node.js runs JavaScript on the server thanks to the V8 engine.",
        "Node.js",
    ),
    (
        "Symfony is a mature PHP framework used by many companies.",
        "Symfony",
    ),
    (
        "The DRY principle (Don't Repeat Yourself) is fundamental in programming.",
        "Concepts",
    ),
    ("API stands for Application Programming Interface.", "API"),
    (
        "REST is an architectural style for web services.",
        "REST",
    ),
    (
        "MySQL is the most popular database management system.",
        "MySQL",
    ),
    (
        "SQLite is an embedded, serverless database.",
        "SQLite",
    ),
    (
        "Composer is the official dependency manager for PHP.",
        "Composer",
    ),
    (
        "GitHub hosts more than 100 million code repositories.",
        "GitHub",
    ),
    (
        "The MVC design pattern separates business logic from presentation.",
        "Design Patterns",
    ),
    (
        "TypeScript adds static typing to JavaScript.",
        "TypeScript",
    ),
    (
        "Vue.js is a progressive, incrementally adoptable JavaScript framework.",
        "Vue.js",
    ),
    (
        "Laravel is an elegant and expressive PHP framework.",
        "Laravel",
    ),
    ("Redis is a very fast in-memory database.", "Redis"),
    (
        "Elasticsearch provides real-time full-text search.",
        "Elasticsearch",
    ),
    (
        "GraphQL lets clients ask for exactly the data they need.",
        "GraphQL",
    ),
    (
        "Microservices split applications into independent services.",
        "Architecture",
    ),
    (
        "CI/CD automates continuous integration and delivery.",
        "DevOps",
    ),
    (
        "Kubernetes orchestrates containers at scale.",
        "Kubernetes",
    ),
    (
        "Web accessibility (a11y) makes sites usable by everyone.",
        "Accessibility",
    ),
];
