//! Domain models

pub mod customer;
pub mod order;
pub mod report;

pub use customer::{
    ActivityStatus, Customer, CustomerCreate, CustomerPage, CustomerSortField, CustomerUpdate,
    CustomerWithStats, SortDirection,
};
pub use order::{
    Additional, AdditionalOption, DeliveryType, Order, OrderDraft, OrderItem, OrderItemDraft,
    OrderPage, OrderStatus, StatusHistoryItem,
};
pub use report::{
    AverageTicketComparison, GroupBy, PerformancePeriod, PerformanceStats, PeriodComparison,
    ProductSales, RevenueReport, SalesBucket, SalesReport, TopProductsReport, Trend, WeekdaySales,
};
