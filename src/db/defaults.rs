//! First-run content and preset statistics.
//!
//! Seeded by [`Repository::initialize_defaults`](super::Repository::initialize_defaults)
//! into empty keys. The preset stats double as the figures public pages show while
//! the store is unreachable.

use crate::models::{
    Chapter, NewsArticle, Person, Review, Stats, ARTICLE_PLACEHOLDER_IMAGE,
    PERSON_PLACEHOLDER_IMAGE,
};

pub fn reviews() -> Vec<Review> {
    vec![
        Review {
            id: "review-1".to_string(),
            name: "Sarah Mitchell".to_string(),
            role: Some("4th Grade Teacher".to_string()),
            school: "Lincoln Elementary".to_string(),
            content: "The hands-on science workshop had every student engaged. Several of \
                      my quieter students asked questions for the first time all year."
                .to_string(),
            rating: 5,
            date: "March 2024".to_string(),
            source: Some("Email".to_string()),
        },
        Review {
            id: "review-2".to_string(),
            name: "David Chen".to_string(),
            role: Some("Parent".to_string()),
            school: "Westview Middle School".to_string(),
            content: "My daughter came home talking about circuits and has not stopped \
                      building things since."
                .to_string(),
            rating: 5,
            date: "February 2024".to_string(),
            source: None,
        },
        Review {
            id: "review-3".to_string(),
            name: "Priya Patel".to_string(),
            role: Some("STEM Coordinator".to_string()),
            school: "Ridgecrest Academy".to_string(),
            content: "Well organised volunteers and lessons that fit right into our \
                      curriculum. We have already booked them again."
                .to_string(),
            rating: 4,
            date: "January 2024".to_string(),
            source: Some("Survey".to_string()),
        },
    ]
}

pub fn articles() -> Vec<NewsArticle> {
    vec![
        NewsArticle {
            id: "article-1".to_string(),
            title: "Expanding to Calgary".to_string(),
            slug: "expanding-to-calgary".to_string(),
            excerpt: "Our newest chapter kicks off with workshops in three schools.".to_string(),
            content: "This fall we launched our **Calgary chapter**. Local volunteers ran \
                      their first robotics and chemistry workshops across three schools."
                .to_string(),
            image: ARTICLE_PLACEHOLDER_IMAGE.to_string(),
            author: "Outreach Team".to_string(),
            date: "September 12, 2024".to_string(),
            read_time: "3 min read".to_string(),
            views: 0,
            comments: 0,
            published: true,
        },
        NewsArticle {
            id: "article-2".to_string(),
            title: "1,000 Students Reached".to_string(),
            slug: "one-thousand-students".to_string(),
            excerpt: "A milestone year for our in-class science program.".to_string(),
            content: "Thanks to our volunteers and partner teachers we have now taught \
                      **over 1,000 students** hands-on science."
                .to_string(),
            image: ARTICLE_PLACEHOLDER_IMAGE.to_string(),
            author: "Outreach Team".to_string(),
            date: "June 3, 2024".to_string(),
            read_time: "2 min read".to_string(),
            views: 0,
            comments: 0,
            published: true,
        },
    ]
}

pub fn people() -> Vec<Person> {
    let person = |id: &str, name: &str, role: &str, chapter: Chapter, order: i64| Person {
        id: id.to_string(),
        name: name.to_string(),
        role: role.to_string(),
        chapter: chapter.as_str().to_string(),
        image: PERSON_PLACEHOLDER_IMAGE.to_string(),
        description: None,
        order,
    };

    vec![
        person("person-1", "Alex Kim", "Founder & President", Chapter::California, 0),
        person("person-2", "Jordan Lee", "Curriculum Lead", Chapter::California, 1),
        person("person-3", "Maya Singh", "Chapter Lead", Chapter::Calgary, 0),
        person("person-4", "Ethan Brooks", "Chapter Lead", Chapter::EllicottCity, 0),
        person("person-5", "Olivia Park", "Volunteer Coordinator", Chapter::EllicottCity, 1),
    ]
}

pub fn homepage_stats() -> Stats {
    Stats {
        schools_visited: 25,
        classes_taught: 120,
        students_inspired: 3000,
    }
}

pub fn chapter_stats(chapter: Chapter) -> Stats {
    match chapter {
        Chapter::California => Stats {
            schools_visited: 15,
            classes_taught: 80,
            students_inspired: 2000,
        },
        Chapter::Calgary => Stats {
            schools_visited: 4,
            classes_taught: 15,
            students_inspired: 400,
        },
        Chapter::EllicottCity => Stats {
            schools_visited: 6,
            classes_taught: 25,
            students_inspired: 600,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_articles_have_unique_slugs() {
        let articles = articles();
        let mut slugs: Vec<_> = articles.iter().map(|a| a.slug.as_str()).collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), articles.len());
        for slug in slugs {
            assert!(crate::validation::validate_slug(slug).is_ok(), "{}", slug);
        }
    }

    #[test]
    fn test_seed_people_ordered_per_chapter() {
        let people = people();
        for chapter in Chapter::ALL {
            let mut orders: Vec<i64> = people
                .iter()
                .filter(|p| p.chapter == chapter.as_str())
                .map(|p| p.order)
                .collect();
            orders.sort();
            assert_eq!(orders, (0..orders.len() as i64).collect::<Vec<_>>());
        }
    }
}
